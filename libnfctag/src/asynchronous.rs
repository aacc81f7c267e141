// libnfctag/src/asynchronous.rs

//! Tokio facade. Engine calls block on hardware answers, so each one runs
//! on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use log::error;

use crate::engine::{NdefDetection, TagEngine};
use crate::types::ConnectionState;
use crate::{Error, Result};

/// Async counterpart of the blocking [`TagEngine`] API.
#[async_trait]
pub trait AsyncTagOps {
    /// See [`TagEngine::connect`].
    async fn connect(&self, tech_index: usize) -> Result<()>;
    /// See [`TagEngine::disconnect`].
    async fn disconnect(&self) -> Result<bool>;
    /// See [`TagEngine::reconnect`].
    async fn reconnect(&self) -> Result<()>;
    /// Hex in, hex out. See [`TagEngine::transceive`].
    async fn transceive(&self, request: String) -> Result<String>;
    /// See [`TagEngine::detect_ndef_info`].
    async fn detect_ndef_info(&self) -> Result<NdefDetection>;
    /// See [`TagEngine::read_ndef`].
    async fn read_ndef(&self) -> Result<String>;
    /// See [`TagEngine::write_ndef`].
    async fn write_ndef(&self, message: String) -> Result<()>;
    /// See [`TagEngine::format_ndef`].
    async fn format_ndef(&self, key: String) -> Result<()>;
    /// See [`TagEngine::is_ndef_formattable`].
    async fn is_ndef_formattable(&self) -> Result<bool>;
    /// See [`TagEngine::set_ndef_read_only`].
    async fn set_ndef_read_only(&self) -> Result<()>;
}

/// Shares one [`TagEngine`] between tasks.
#[derive(Debug, Clone)]
pub struct AsyncTagEngine {
    engine: Arc<TagEngine>,
}

impl AsyncTagEngine {
    /// Takes ownership of a built engine.
    pub fn new(engine: TagEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Blocking engine for calls that never wait on hardware.
    pub fn engine(&self) -> &TagEngine {
        &self.engine
    }

    /// Current state of the connected tag.
    pub fn connection_state(&self) -> ConnectionState {
        self.engine.connection_state()
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&TagEngine) -> Result<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || f(&*engine)).await {
            Ok(result) => result,
            Err(e) => {
                error!("{} task failed: {}", operation, e);
                Err(Error::Aborted { operation })
            }
        }
    }
}

#[async_trait]
impl AsyncTagOps for AsyncTagEngine {
    async fn connect(&self, tech_index: usize) -> Result<()> {
        self.run("connect", move |e| e.connect(tech_index)).await
    }

    async fn disconnect(&self) -> Result<bool> {
        self.run("disconnect", |e| e.disconnect()).await
    }

    async fn reconnect(&self) -> Result<()> {
        self.run("reconnect", |e| e.reconnect()).await
    }

    async fn transceive(&self, request: String) -> Result<String> {
        self.run("transceive", move |e| e.transceive(&request)).await
    }

    async fn detect_ndef_info(&self) -> Result<NdefDetection> {
        self.run("ndef detect", |e| e.detect_ndef_info()).await
    }

    async fn read_ndef(&self) -> Result<String> {
        self.run("ndef read", |e| e.read_ndef()).await
    }

    async fn write_ndef(&self, message: String) -> Result<()> {
        self.run("ndef write", move |e| e.write_ndef(&message)).await
    }

    async fn format_ndef(&self, key: String) -> Result<()> {
        self.run("format", move |e| e.format_ndef(&key)).await
    }

    async fn is_ndef_formattable(&self) -> Result<bool> {
        self.run("formattable", |e| e.is_ndef_formattable()).await
    }

    async fn set_ndef_read_only(&self) -> Result<()> {
        self.run("set read-only", |e| e.set_ndef_read_only()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{discover, engine_with_mock, t2t_activation};

    #[tokio::test]
    async fn transceive_runs_off_the_runtime() {
        let (engine, mock) = engine_with_mock().unwrap();
        discover(&engine, &mock, t2t_activation(1, &[0x04, 1, 2, 3, 4, 5, 6])).unwrap();
        mock.push_frame_reply(vec![0x01, 0x02]);

        let engine = AsyncTagEngine::new(engine);
        let response = engine.transceive("3000".into()).await.unwrap();
        assert_eq!(response, "0102");
        assert_eq!(engine.connection_state(), ConnectionState::Active);
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let (engine, _mock) = engine_with_mock().unwrap();
        let engine = AsyncTagEngine::new(engine);
        assert_eq!(engine.connect(0).await, Err(Error::NotActive));
    }
}
