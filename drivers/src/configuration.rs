use crate::controls;

/// Vertical sync role for multi-camera setups.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TriggerMode {
    #[default]
    Standalone,
    Source,
    Sink,
}

impl TriggerMode {
    pub fn from_raw(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(Self::Standalone),
            1 => Some(Self::Source),
            2 => Some(Self::Sink),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub dpc_enable: bool,
    pub trigger_mode: TriggerMode,
    pub trigger_mode_override: Option<TriggerMode>,
    pub test_pattern: controls::TestPattern,
    pub power_on_delay_us: u64,
}

impl Configuration {
    pub const DEFAULT: Configuration = Configuration {
        dpc_enable: true,
        trigger_mode: TriggerMode::Standalone,
        trigger_mode_override: None,
        test_pattern: controls::TestPattern::Disabled,
        power_on_delay_us: 8000,
    };

    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }

    pub fn effective_trigger_mode(&self) -> TriggerMode {
        self.trigger_mode_override.unwrap_or(self.trigger_mode)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}
