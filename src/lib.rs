#![cfg_attr(not(test), no_std)]

mod error;
mod log;

pub mod config;
pub mod device;
pub mod fifo;
pub mod interface;
pub mod params;
pub mod registers;
pub mod rtor;

pub use crate::config::{Config, SignalLimits};
pub use crate::device::{InitState, LeadOffCause, Max30003, StatusSnapshot};
pub use crate::error::{Error, Result};
pub use crate::fifo::{EcgFrame, EcgTag};
pub use crate::registers::Register;
pub use crate::rtor::RtorReading;
