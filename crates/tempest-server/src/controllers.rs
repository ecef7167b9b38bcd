// File: src/controllers.rs
// Purpose: Demo controllers served by the reference server

use tempest::{Bindable, Bucket, Controller, Output, Response, Value};

/// A member of the demo user directory
#[derive(Debug, Clone)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub joined: String,
}

impl User {
    fn new(id: u32, name: &str, email: &str, joined: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            joined: joined.to_string(),
        }
    }

    fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Bindable for User {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "email" => Some(self.email.as_str().into()),
            "joined" => Some(self.joined.as_str().into()),
            _ => None,
        }
    }

    fn call(&self, method: &str) -> Option<Value> {
        match method {
            "initials" => Some(self.initials().into()),
            "profile_url" => Some(format!("/users/{}", self.id).into()),
            _ => None,
        }
    }

    fn display(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

pub fn directory() -> Vec<User> {
    vec![
        User::new(1, "ada lovelace", "ada@example.com", "1843-07-10"),
        User::new(2, "grace hopper", "grace@example.com", "1952-05-01"),
        User::new(3, "alan turing", "alan@example.com", "1936-11-12"),
    ]
}

/// Every demo controller
pub fn all(app_name: &str) -> Vec<Controller> {
    vec![home(app_name.to_string()), users()]
}

fn home(app_name: String) -> Controller {
    Controller::new("Home").action("index", move |_req, services| {
        let data = Value::object([
            ("app", Value::from(app_name.as_str())),
            ("user_count", Value::from(directory().len() as i64)),
        ]);
        Ok(Output::Template(services.render("index", &data)?))
    })
}

fn users() -> Controller {
    Controller::new("Users")
        .action("list", |req, services| {
            let filter = req.input(Bucket::Query, "q", "").to_lowercase();
            let items: Vec<Value> = directory()
                .into_iter()
                .filter(|user| user.name.contains(&filter))
                .map(Value::record)
                .collect();

            let item = services.view("users/item")?;
            let rows = services.engine.render_each(
                &item,
                &items,
                Some("item"),
                "<li class=\"empty\">No users match.</li>",
            );

            let data = Value::object([
                ("rows", Value::from(rows)),
                ("count", Value::from(items.len() as i64)),
            ]);
            Ok(Output::Template(services.render("users/list", &data)?))
        })
        .action("show", |req, services| {
            let id = req.input(Bucket::Named, "id", "");
            let user = id
                .parse::<u32>()
                .ok()
                .and_then(|id| directory().into_iter().find(|user| user.id == id));

            match user {
                Some(user) => {
                    let data = Value::object([("user", Value::record(user))]);
                    Ok(Output::Template(services.render("users/show", &data)?))
                }
                None => Ok(Output::Response(Response::not_found(format!(
                    "<h1>No user with id {}</h1>",
                    tempest::hooks::escape_html(id)
                )))),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initials() {
        assert_eq!(directory()[0].initials(), "AL");
    }

    #[test]
    fn test_user_fields() {
        let user = directory().remove(1);
        assert_eq!(user.field("id"), Some(Value::Number(2.0)));
        assert_eq!(user.call("profile_url"), Some(Value::from("/users/2")));
        assert_eq!(user.field("password"), None);
    }
}
