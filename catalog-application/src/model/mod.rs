mod item;
mod user;

pub use item::{ITEM_SORT_SAFELIST, Item, ItemId, MAX_PRICE, MIN_PRICE};
pub use user::User;
