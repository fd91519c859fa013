pub mod accounts;
pub mod commerce;
pub mod media;
