mod audio_host_factory;
mod object_store_host;

pub use audio_host_factory::{AudioHostFactory, StorageProvider};
pub use object_store_host::{AUDIO_PREFIX, ObjectStoreAudioHost};
