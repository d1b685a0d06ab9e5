//! Test Helper Utilities
//!
//! In-memory fakes for every external seam of tunebot-order

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{
    sample_credential, sample_song, FakeCatalog, FakeQrService, FakeTransport, MemorySlot,
    UrlReply,
};
