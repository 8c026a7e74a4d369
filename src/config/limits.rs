//! Protocol limits configuration.

use serde::Deserialize;

/// Minimum allowed protocol line length (RFC 1459).
pub const MIN_LINE_LEN: u32 = 512;

/// Protocol limits (`[limits]`).
///
/// Missing fields default to zero and are then rejected by validation, so a
/// config must set every length limit explicitly.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    #[serde(default)]
    pub awaylen: u32,
    #[serde(default)]
    pub chan_list_modes: u32,
    #[serde(default)]
    pub channellen: u32,
    #[serde(default)]
    pub kicklen: u32,
    #[serde(default)]
    pub monitor_entries: u32,
    #[serde(default)]
    pub nicklen: u32,
    #[serde(default)]
    pub topiclen: u32,
    #[serde(default)]
    pub whowas_entries: u32,
    #[serde(default)]
    pub linelen: LineLenConfig,
}

/// Maximum line lengths, split into the tag section and the rest of the line.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct LineLenConfig {
    #[serde(default)]
    pub tags: u32,
    #[serde(default)]
    pub rest: u32,
}

impl LimitsConfig {
    /// Whether the name and message lengths are usable.
    pub fn lengths_are_sane(&self) -> bool {
        self.nicklen >= 1
            && self.channellen >= 2
            && self.awaylen >= 1
            && self.kicklen >= 1
            && self.topiclen >= 1
    }
}

impl LineLenConfig {
    pub fn is_sane(&self) -> bool {
        self.tags >= MIN_LINE_LEN && self.rest >= MIN_LINE_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sane() -> LimitsConfig {
        LimitsConfig {
            awaylen: 200,
            chan_list_modes: 60,
            channellen: 64,
            kicklen: 390,
            monitor_entries: 100,
            nicklen: 32,
            topiclen: 390,
            whowas_entries: 100,
            linelen: LineLenConfig {
                tags: 2048,
                rest: 2048,
            },
        }
    }

    #[test]
    fn default_limits_are_rejected() {
        let config = LimitsConfig::default();
        assert!(!config.lengths_are_sane());
        assert!(!config.linelen.is_sane());
    }

    #[test]
    fn sane_limits_pass() {
        let config = sane();
        assert!(config.lengths_are_sane());
        assert!(config.linelen.is_sane());
    }

    #[test]
    fn channellen_needs_room_for_prefix() {
        let config = LimitsConfig {
            channellen: 1,
            ..sane()
        };
        assert!(!config.lengths_are_sane());
    }

    #[test]
    fn line_lengths_must_reach_512() {
        assert!(LineLenConfig { tags: 512, rest: 512 }.is_sane());
        assert!(!LineLenConfig { tags: 511, rest: 2048 }.is_sane());
        assert!(!LineLenConfig { tags: 2048, rest: 511 }.is_sane());
    }

    #[test]
    fn deserialize_partial_limits() {
        let config: LimitsConfig = toml::from_str(
            r#"
            nicklen = 32
            [linelen]
            rest = 1024
        "#,
        )
        .unwrap();
        assert_eq!(config.nicklen, 32);
        assert_eq!(config.channellen, 0);
        assert_eq!(config.linelen.rest, 1024);
        assert_eq!(config.linelen.tags, 0);
    }
}
