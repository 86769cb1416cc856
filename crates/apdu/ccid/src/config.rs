//! Configuration options for CCID transport

use crate::frame::{LevelParameter, MAX_PAYLOAD_LEN, TransferOptions};
use crate::instruction::PowerSelect;

/// Configuration options for CCID transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcidConfig {
    /// Slot the card sits in
    pub slot: u8,

    /// bBWI sent with every XfrBlock
    ///
    /// Non-zero values allow the reader to extend the block waiting time.
    pub block_wait: u8,

    /// wLevelParameter sent with every XfrBlock
    pub level_parameter: LevelParameter,

    /// Voltage requested at power on
    pub power_select: PowerSelect,

    /// Largest payload the reader accepts (its dwMaxCCIDMessageLength minus
    /// the header)
    pub max_message_length: usize,

    /// How many consecutive time extension replies are tolerated for one request
    pub max_time_extensions: u32,
}

impl Default for CcidConfig {
    fn default() -> Self {
        Self {
            slot: 0,
            block_wait: 0x01,
            level_parameter: LevelParameter::BeginAndEnd,
            power_select: PowerSelect::Automatic,
            max_message_length: MAX_PAYLOAD_LEN,
            max_time_extensions: 64,
        }
    }
}

impl CcidConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slot
    pub const fn with_slot(mut self, slot: u8) -> Self {
        self.slot = slot;
        self
    }

    /// Set the block waiting time integer
    pub const fn with_block_wait(mut self, block_wait: u8) -> Self {
        self.block_wait = block_wait;
        self
    }

    /// Set the XfrBlock level parameter
    pub const fn with_level_parameter(mut self, level: LevelParameter) -> Self {
        self.level_parameter = level;
        self
    }

    /// Set the power on voltage
    pub const fn with_power_select(mut self, power_select: PowerSelect) -> Self {
        self.power_select = power_select;
        self
    }

    /// Set the largest payload the reader accepts
    pub const fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    /// Set the time extension limit
    pub const fn with_max_time_extensions(mut self, max: u32) -> Self {
        self.max_time_extensions = max;
        self
    }

    /// Transfer options derived from this configuration
    pub const fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            slot: self.slot,
            block_wait: self.block_wait,
            level: self.level_parameter,
            max_payload_len: self.max_message_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_wait_extension() {
        let options = CcidConfig::default().transfer_options();
        assert!(options.wait_extension_allowed());
        assert_eq!(options, TransferOptions::default());
    }

    #[test]
    fn test_builders() {
        let config = CcidConfig::new()
            .with_slot(1)
            .with_block_wait(0)
            .with_max_message_length(261)
            .with_max_time_extensions(3);

        let options = config.transfer_options();
        assert_eq!(options.slot, 1);
        assert!(!options.wait_extension_allowed());
        assert_eq!(options.max_payload_len, 261);
        assert_eq!(config.max_time_extensions, 3);
    }
}
