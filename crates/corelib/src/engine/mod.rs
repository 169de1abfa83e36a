//! Consistent-hashing algorithm engines.
//!
//! Bucket-indexed engines: Anchor, Dx, Jump, JumpBack, Binomial, Flip, Power,
//! Memento, Recall. Name-indexed engines: Rendezvous, Maglev, MultiProbe,
//! Ring. All of them hash through the pluggable [`crate::HashFunction`]
//! abstraction and none of them owns node identity.

pub mod anchor;
pub mod binomial;
pub mod dx;
pub mod flip;
pub mod jump;
pub mod jumpback;
pub mod maglev;
pub mod memento;
pub mod multiprobe;
pub mod power;
pub mod recall;
pub mod rendezvous;
pub mod ring;
pub mod traits;

pub use anchor::AnchorEngine;
pub use binomial::BinomialEngine;
pub use dx::DxEngine;
pub use flip::FlipEngine;
pub use jump::JumpEngine;
pub use jumpback::JumpBackEngine;
pub use maglev::MaglevEngine;
pub use memento::MementoEngine;
pub use multiprobe::MultiProbeEngine;
pub use power::PowerEngine;
pub use recall::RecallEngine;
pub use rendezvous::RendezvousEngine;
pub use ring::RingEngine;
pub use traits::{BucketEngine, NameEngine};
