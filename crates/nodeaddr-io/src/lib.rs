//! `nodeaddr-io` is the single supported public entrypoint for the hybrid
//! address engine: typed addresses and field paths, payload interpolation,
//! content contracts and tree resolution, and the address service that talks
//! to a content store.
//!
//! The store itself is a port ([`port::ContentStore`]). This crate ships an
//! in-memory implementation; real transports live in higher layers.

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `nodeaddr_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may change
// without notice.

pub mod autosave;
pub mod error;
pub mod memory;
pub mod port;
pub mod service;

/// Address grammar and path builders.
#[doc(hidden)]
pub mod address {
    pub use nodeaddr_core::{
        AddressFormatError, AddressValidation, FieldLocation, HybridAddress, ParsedAddress,
        generate_field_path, generate_section_path, normalize_path, validate_address,
    };
}

/// Payload interpolation.
#[doc(hidden)]
pub mod interp {
    pub use nodeaddr_interp::{
        InterpolationContext, extract_tokens, get_nested_value, has_interpolation_tokens,
        interpolate_json, interpolate_string, merge_job, unresolved_tokens,
    };
}

/// Content model, contracts, resolution and validation.
#[doc(hidden)]
pub mod content {
    pub use nodeaddr_content::*;
}

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::address::{
        AddressFormatError, AddressValidation, FieldLocation, HybridAddress, ParsedAddress,
        generate_field_path, generate_section_path, normalize_path, validate_address,
    };
    pub use crate::autosave::{AutosaveOptions, Debouncer};
    pub use crate::content::{
        ContentDocument, ContentKind, ContractCheck, FieldRegistry, FieldValidationOptions,
        FormContent, FormItem, check_content, find_field_value, library_fingerprint,
        sanitize_for_library, set_field_value, validate_form,
    };
    pub use crate::error::{EngineError, RemoteError};
    pub use crate::interp::{
        InterpolationContext, has_interpolation_tokens, interpolate_json, interpolate_string,
        unresolved_tokens,
    };
    pub use crate::memory::MemoryStore;
    pub use crate::port::{ContentStore, ParsedAddrRow, StoreError};
    pub use crate::service::{HybridAddressService, Lookup, ServiceOptions};
}
