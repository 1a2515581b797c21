//! Structural elements module

mod pile;
mod section;
mod spring;

pub use pile::{HeadFixity, PileSpec};
pub use section::{BeamSection, HeadStiffness};
pub use spring::{SpringKind, SpringLaw, SpringParams};
