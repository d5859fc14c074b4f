mod aggregate;

pub use aggregate::{CollectionBook, JokeCollection, DEFAULT_COLLECTION_EMOJI};
