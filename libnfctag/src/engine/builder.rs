// libnfctag/src/engine/builder.rs

use std::sync::Arc;

use log::debug;

use crate::engine::{EngineConfig, EngineInner, TagEngine};
use crate::tag::TagListener;
use crate::transport::{EventSink, HardwareChannel};
use crate::{Error, Result};

/// Helper to construct a [`TagEngine`] with optional configuration.
#[derive(Default)]
pub struct TagEngineBuilder {
    channel: Option<Arc<dyn HardwareChannel>>,
    config: EngineConfig,
    listener: Option<Arc<dyn TagListener>>,
}

impl TagEngineBuilder {
    /// Builder with default configuration and no listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the controller library (e.g. a MockChannel)
    pub fn with_channel(mut self, channel: Arc<dyn HardwareChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Replace the default wait budgets and quirk switches
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Receive tag arrival and loss callbacks
    pub fn with_listener(mut self, listener: Arc<dyn TagListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Consume the builder and register the engine as the channel's event
    /// sink. Requires a channel; otherwise returns ChannelMissing.
    pub fn build(self) -> Result<TagEngine> {
        let channel = self.channel.ok_or(Error::ChannelMissing)?;
        let inner = Arc::new(EngineInner::new(self.config, Arc::clone(&channel)));
        inner.registry.set_listener(self.listener);

        let sink: Arc<dyn EventSink> = inner.clone();
        channel.register_sink(Arc::downgrade(&sink));
        debug!("engine built: {:?}", inner.config);
        Ok(TagEngine::from_inner(inner))
    }
}
