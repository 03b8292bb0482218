pub mod history;
pub mod issue;
pub mod revoke;
pub mod share;
pub mod status;
pub mod verify;
pub mod verify_hash;
