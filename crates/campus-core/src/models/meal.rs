use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMenu {
    pub id: Id,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub cafeteria: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    pub price: Option<f64>,
    #[serde(default)]
    pub is_vegetarian: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuItem {
    Name(String),
    Detailed {
        name: String,
        calories: Option<u32>,
    },
}

impl MenuItem {
    pub fn name(&self) -> &str {
        match self {
            MenuItem::Name(name) | MenuItem::Detailed { name, .. } => name,
        }
    }
}

impl MealMenu {
    pub fn items_display(&self) -> String {
        self.items.iter().map(MenuItem::name).collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealReservation {
    pub id: Id,
    pub menu_id: Option<Id>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub status: Option<String>,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealReservationRequest {
    pub menu_id: Id,
}
