use serde::Deserialize;

/// Form body posted to `/register`.
#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct GreetingQuery {
    pub name: Option<String>,
}

impl GreetingQuery {
    /// `name`, or `World` when missing or empty.
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("World")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_name_defaults_to_world() {
        assert_eq!(GreetingQuery { name: None }.name(), "World");
        assert_eq!(GreetingQuery { name: Some(String::new()) }.name(), "World");
        assert_eq!(GreetingQuery { name: Some("Bob".into()) }.name(), "Bob");
    }
}
