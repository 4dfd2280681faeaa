//! Resources served by this provider
//!
//! Every resource implements [`declarative::Resource`] and is registered
//! once at startup through [`register`].

use declarative::ProviderBuilder;

pub mod file;

pub use file::{FILE_TYPE_TOKEN, File};

/// Register every resource this provider serves
pub fn register(builder: ProviderBuilder) -> ProviderBuilder {
    builder.with_resource(File)
}
