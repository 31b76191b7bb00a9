//! Orders: snapshot entity, creation request and enumerations.

mod entity;
mod value_objects;

pub use entity::{CreateOrderRequest, Order};
pub use value_objects::{OrderSide, OrderStatus, OrderType, TimeInForce};
