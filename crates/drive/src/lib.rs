//! Drive sync for the Homie knowledge base.
//!
//! Lists the files in a cloud folder, extracts their text, categorizes
//! each file by its name, and replaces the matching knowledge sections.
//! The Drive API itself sits behind the [`DriveClient`] trait so the sync
//! logic (and its tests) never touch the network.

pub mod client;
pub mod sync;

pub use client::{DriveClient, DriveFile, HttpDriveClient};
pub use sync::{categorize_file, sync_folder, SyncReport};
