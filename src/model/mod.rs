pub mod billing;
pub mod common;
pub mod parcel;
pub mod party;
pub mod tax;

pub use billing::*;
pub use common::*;
pub use parcel::*;
pub use party::*;
pub use tax::*;
