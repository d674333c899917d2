//! IEC 60870-5-104 type definitions.
//!
//! - `Apci` - control field of an APDU
//! - `TypeId`, `TypeCode` - type identification and its element layout
//! - `Cot` - cause of transmission
//! - `Asdu`, `AsduCodec` - application service data unit
//! - `InformationElement` - element values
//! - `Quality` and friends - quality descriptor flags
//! - `Cp56Time2a`, `Cp24Time2a`, `Cp16Time2a` - time tags

mod apci;
mod asdu;
mod cot;
mod element;
mod quality;
mod time;
mod type_id;

pub use apci::*;
pub use asdu::*;
pub use cot::*;
pub use element::*;
pub use quality::*;
pub use time::*;
pub use type_id::*;
