use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use data_encoding::HEXLOWER_PERMISSIVE;
use serde::{Deserialize, Serialize};

/// Length of a Threema ID or gateway ID
const THREEMA_ID_LENGTH: usize = 8;

/// Length of the gateway private key in bytes
const PRIVATE_KEY_BYTES: usize = 32;

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RawConfig {
    pub serial: Serial,
    pub threema: Option<RawThreema>,
}

impl RawConfig {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file at {:?}", path))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context("Failed to read config file to string")?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn example() -> Self {
        Self {
            serial: Serial {
                port: PathBuf::from("/dev/ttyACM0"),
                baudrate: 9600,
            },
            threema: Some(RawThreema {
                gateway_id: "*YOUR_ID".to_string(),
                gateway_secret: "your-gateway-secret".to_string(),
                private_key: "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"
                    .to_string(),
                recipients: vec!["AAAAAAAA".to_string(), "BBBBBBBB".to_string()],
            }),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct Serial {
    /// The serial port.
    pub port: PathBuf,

    /// The baud rate.
    pub baudrate: u32,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RawThreema {
    /// Gateway ID (8 characters)
    pub gateway_id: String,

    /// Gateway secret (from the Gateway website)
    pub gateway_secret: String,

    /// Private key (32 bytes as lowercase hex string)
    pub private_key: String,

    /// List of recipients (Threema IDs)
    pub recipients: Vec<String>,
}

#[derive(Debug)]
pub struct Config {
    pub serial: Serial,
    pub threema: Option<Threema>,
}

#[derive(Debug)]
pub struct Threema {
    /// Gateway ID (8 characters)
    pub gateway_id: String,

    /// Gateway secret (from the Gateway website)
    pub gateway_secret: String,

    /// Private key (validated, 32 bytes as lowercase hex string)
    pub private_key: String,

    /// List of recipients (Threema IDs)
    pub recipients: Vec<String>,
}

impl TryFrom<RawThreema> for Threema {
    type Error = anyhow::Error;

    fn try_from(raw: RawThreema) -> Result<Self, Self::Error> {
        if !raw.gateway_id.starts_with('*') || raw.gateway_id.len() != THREEMA_ID_LENGTH {
            bail!(
                "Invalid Threema gateway ID {:?}, must be 8 characters starting with '*'",
                raw.gateway_id
            );
        }
        if let Some(recipient) = raw
            .recipients
            .iter()
            .find(|id| id.len() != THREEMA_ID_LENGTH)
        {
            bail!("Invalid Threema ID {:?}, must be 8 characters", recipient);
        }

        let private_key = HEXLOWER_PERMISSIVE
            .decode(raw.private_key.as_bytes())
            .context("Could not decode Threema private key hex string")?;
        if private_key.len() != PRIVATE_KEY_BYTES {
            bail!(
                "Invalid Threema private key, expected {} bytes but got {}",
                PRIVATE_KEY_BYTES,
                private_key.len()
            );
        }

        Ok(Threema {
            gateway_id: raw.gateway_id,
            gateway_secret: raw.gateway_secret,
            private_key: HEXLOWER_PERMISSIVE.encode(&private_key),
            recipients: raw.recipients,
        })
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw_config: RawConfig) -> Result<Self, Self::Error> {
        let threema = raw_config.threema.map(Threema::try_from).transpose()?;
        Ok(Config {
            serial: raw_config.serial,
            threema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &str = "00112233445566778899AABBCCDDEEFF00112233445566778899aabbccddeeff";

    fn raw_threema() -> RawThreema {
        RawThreema {
            gateway_id: "*FANCTRL".to_string(),
            gateway_secret: "secret".to_string(),
            private_key: PRIVATE_KEY.to_string(),
            recipients: vec!["ECHOECHO".to_string()],
        }
    }

    #[test]
    fn test_parse() {
        let raw: RawConfig = toml::from_str(
            r#"
            [serial]
            port = "/dev/ttyACM1"
            baudrate = 115200
            "#,
        )
        .unwrap();
        assert_eq!(raw.serial.port, PathBuf::from("/dev/ttyACM1"));
        assert_eq!(raw.serial.baudrate, 115200);
        assert_eq!(raw.threema, None);

        let config = Config::try_from(raw).unwrap();
        assert!(config.threema.is_none());
    }

    #[test]
    fn test_example_roundtrip() {
        let example = toml::to_string(&RawConfig::example()).unwrap();
        let parsed: RawConfig = toml::from_str(&example).unwrap();
        assert_eq!(parsed, RawConfig::example());
    }

    #[test]
    fn test_example_is_valid() {
        let config = Config::try_from(RawConfig::example()).unwrap();
        let threema = config.threema.unwrap();
        assert_eq!(threema.gateway_id, "*YOUR_ID");
        assert_eq!(threema.recipients.len(), 2);
    }

    #[test]
    fn test_valid_threema() {
        let threema = Threema::try_from(raw_threema()).unwrap();
        assert_eq!(threema.private_key, PRIVATE_KEY.to_lowercase());
        assert_eq!(threema.recipients, vec!["ECHOECHO".to_string()]);
    }

    #[test]
    fn test_invalid_threema() {
        let short_key = RawThreema {
            private_key: "0011".to_string(),
            ..raw_threema()
        };
        assert!(Threema::try_from(short_key).is_err());

        let gateway_id = RawThreema {
            gateway_id: "FANCTRL1".to_string(),
            ..raw_threema()
        };
        assert!(Threema::try_from(gateway_id).is_err());

        let recipient = RawThreema {
            recipients: vec!["ECHO".to_string()],
            ..raw_threema()
        };
        assert!(Threema::try_from(recipient).is_err());
    }
}
