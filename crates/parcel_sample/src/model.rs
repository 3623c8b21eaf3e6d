use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub pages: u32,
    pub authors: Vec<String>,
}
