// Entity Models - the organizational tree
//
// Area -> City -> Building -> Unit -> {Vehicle, Person}
//
// Plain values: built once per load by the hierarchy builder, never mutated
// afterwards, rebuilt from scratch on reload.

pub mod area;
pub mod unit;

pub use area::{fold_name, Area, Building, City};
pub use unit::{Person, Unit, Vehicle};
