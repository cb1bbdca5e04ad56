pub mod fs_signature_store;
