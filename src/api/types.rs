use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
  pub skip: u64,
  pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  #[serde(default)]
  pub lat: f64,
  #[serde(default)]
  pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
  pub address: String,
  pub city: String,
  pub state: String,
  pub state_code: Option<String>,
  pub postal_code: String,
  pub coordinates: Coordinates,
  pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hair {
  pub color: String,
  #[serde(rename = "type")]
  pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bank {
  pub card_expire: String,
  pub card_number: String,
  pub card_type: String,
  pub currency: String,
  pub iban: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
  pub department: String,
  pub name: String,
  pub title: String,
  pub address: Address,
}

/// User record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
  pub id: u64,
  pub first_name: String,
  pub last_name: String,
  pub maiden_name: String,
  pub age: u32,
  pub gender: String,
  pub email: String,
  pub phone: String,
  pub username: String,
  pub birth_date: String,
  pub image: String,
  pub blood_group: String,
  pub height: f64,
  pub weight: f64,
  pub eye_color: String,
  pub hair: Hair,
  pub domain: Option<String>,
  pub ip: String,
  pub address: Address,
  pub mac_address: String,
  pub university: String,
  pub bank: Bank,
  pub company: Company,
  pub ein: String,
  pub ssn: String,
  pub user_agent: String,
  pub role: Option<String>,
}

impl User {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
  pub rating: f64,
  pub comment: String,
  pub date: String,
  pub reviewer_name: String,
  pub reviewer_email: String,
}

/// Product record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
  pub id: u64,
  pub title: String,
  pub description: String,
  pub category: String,
  pub price: f64,
  pub discount_percentage: f64,
  pub rating: f64,
  pub stock: u64,
  /// Some catalogue items have no brand
  pub brand: Option<String>,
  pub thumbnail: String,
  pub images: Vec<String>,
  pub tags: Vec<String>,
  pub sku: Option<String>,
  pub availability_status: Option<String>,
  pub warranty_information: Option<String>,
  pub shipping_information: Option<String>,
  pub return_policy: Option<String>,
  pub minimum_order_quantity: Option<u64>,
  pub reviews: Vec<Review>,
}

impl Product {
  /// Price after the advertised discount
  pub fn discounted_price(&self) -> f64 {
    self.price * (1.0 - self.discount_percentage / 100.0)
  }
}

/// Product category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub slug: String,
  pub name: String,
  #[serde(default)]
  pub url: String,
}

/// Credentials exchanged at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

/// Profile of the logged-in account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
  pub id: u64,
  pub username: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub image: String,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub token: String,
  pub refresh_token: Option<String>,
  pub user: SessionUser,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_discounted_price() {
    let product = Product {
      price: 200.0,
      discount_percentage: 25.0,
      ..Default::default()
    };
    assert!((product.discounted_price() - 150.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_user_deserializes_nested_fields() {
    let json = r#"{
      "id": 1,
      "firstName": "Emily",
      "lastName": "Johnson",
      "gender": "female",
      "hair": {"color": "Brown", "type": "Curly"},
      "address": {"city": "Phoenix", "postalCode": "29112", "coordinates": {"lat": 1.5, "lng": -2.0}},
      "company": {"name": "Dooley, Kozey and Cronin", "title": "Sales Manager"}
    }"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.full_name(), "Emily Johnson");
    assert_eq!(user.hair.kind, "Curly");
    assert_eq!(user.address.postal_code, "29112");
    assert_eq!(user.address.coordinates.lng, -2.0);
    assert_eq!(user.company.title, "Sales Manager");
    assert_eq!(user.age, 0);
  }

  #[test]
  fn test_product_without_brand() {
    let json = r#"{"id": 16, "title": "Apple", "price": 1.99, "tags": ["fruits"]}"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.brand, None);
    assert_eq!(product.tags, vec!["fruits".to_string()]);
  }
}
