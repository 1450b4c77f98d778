//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod collection_card;
pub mod color;
pub mod deck;
pub mod deck_card;
pub mod external_collection;
pub mod external_collection_card;
pub mod external_wishlist;
pub mod external_wishlist_card;
pub mod master_card;
pub mod price_point;
pub mod value_snapshot;
pub mod wishlist_card;

// Re-export specific types to avoid conflicts
pub use collection_card::{
    Column as CollectionCardColumn, Entity as CollectionCard, Model as CollectionCardModel,
};
pub use color::CardColor;
pub use deck::{Column as DeckColumn, Entity as Deck, Model as DeckModel};
pub use deck_card::{Column as DeckCardColumn, Entity as DeckCard, Model as DeckCardModel};
pub use external_collection::{
    Column as ExternalCollectionColumn, Entity as ExternalCollection,
    Model as ExternalCollectionModel,
};
pub use external_collection_card::{
    Column as ExternalCollectionCardColumn, Entity as ExternalCollectionCard,
    Model as ExternalCollectionCardModel,
};
pub use external_wishlist::{
    Column as ExternalWishlistColumn, Entity as ExternalWishlist, Model as ExternalWishlistModel,
};
pub use external_wishlist_card::{
    Column as ExternalWishlistCardColumn, Entity as ExternalWishlistCard,
    Model as ExternalWishlistCardModel,
};
pub use master_card::{Column as MasterCardColumn, Entity as MasterCard, Model as MasterCardModel};
pub use price_point::{Column as PricePointColumn, Entity as PricePoint, Model as PricePointModel};
pub use value_snapshot::{
    Column as ValueSnapshotColumn, Entity as ValueSnapshot, Model as ValueSnapshotModel,
};
pub use wishlist_card::{
    Column as WishlistCardColumn, Entity as WishlistCard, Model as WishlistCardModel,
};
