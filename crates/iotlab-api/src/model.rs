// Typed arguments for façade endpoints
//
// Responses stay as `serde_json::Value`: the REST service owns their
// schema. Only the values this crate has to produce or validate are typed.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Error;
use crate::response::ResponseKind;

/// Selector for `GET experiments/{id}[?option]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum InfoOption {
    /// Full experiment submission (no query).
    #[strum(serialize = "")]
    Submission,
    /// Resources list.
    Resources,
    /// Resources id list, `1-34+72` format.
    Id,
    /// Experiment state.
    State,
    /// tar.gz archive with description and firmwares.
    Data,
}

impl InfoOption {
    /// Parse a caller-supplied option string.
    ///
    /// Anything outside `'', 'resources', 'id', 'state', 'data'` is a
    /// [`Error::Contract`].
    pub fn parse(option: &str) -> Result<Self, Error> {
        option.parse().map_err(|_| Error::Contract {
            argument: "experiment info option".into(),
            reason: format!(
                "'{option}' is not one of '', 'resources', 'id', 'state', 'data'"
            ),
        })
    }

    /// Key-only query flag, if any.
    pub fn query_flag(self) -> Option<&'static str> {
        match self {
            Self::Submission => None,
            Self::Resources => Some("resources"),
            Self::Id => Some("id"),
            Self::State => Some("state"),
            Self::Data => Some("data"),
        }
    }

    pub fn response_kind(self) -> ResponseKind {
        match self {
            Self::Data => ResponseKind::Binary,
            _ => ResponseKind::Json,
        }
    }
}

/// Commands accepted by `POST experiments/{id}/nodes?{command}`.
///
/// Firmware update is a multipart call of its own, see
/// [`Api::node_update`](crate::Api::node_update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum NodeCommand {
    Start,
    Stop,
    Reset,
}

/// Nodes a firmware or profile is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmwareAssociation {
    #[serde(rename = "firmwarename")]
    pub firmware_name: String,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileAssociation {
    #[serde(rename = "profilename")]
    pub profile_name: String,
    pub nodes: Vec<String>,
}

/// Description of a physical-nodes experiment, sent as `new_exp.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentDescription {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Minutes.
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Scheduled start, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<u64>,
    pub nodes: Vec<String>,
    #[serde(
        rename = "firmwareassociations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub firmware_associations: Vec<FirmwareAssociation>,
    #[serde(rename = "profileassociations", skip_serializing_if = "Vec::is_empty")]
    pub profile_associations: Vec<ProfileAssociation>,
}

impl ExperimentDescription {
    /// Multipart file name the service expects for the description.
    pub const FILE_NAME: &'static str = "new_exp.json";

    pub fn physical(duration: u32, nodes: Vec<String>) -> Self {
        Self {
            kind: "physical",
            duration,
            name: None,
            reservation: None,
            nodes,
            firmware_associations: Vec::new(),
            profile_associations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_reservation(mut self, timestamp: u64) -> Self {
        self.reservation = Some(timestamp);
        self
    }

    /// Bind `firmware_name` to `nodes`; an empty list means every node.
    #[must_use]
    pub fn with_firmware(mut self, firmware_name: impl Into<String>, nodes: Vec<String>) -> Self {
        let nodes = if nodes.is_empty() { self.nodes.clone() } else { nodes };
        self.firmware_associations.push(FirmwareAssociation {
            firmware_name: firmware_name.into(),
            nodes,
        });
        self
    }

    /// Bind `profile_name` to `nodes`; an empty list means every node.
    #[must_use]
    pub fn with_profile(mut self, profile_name: impl Into<String>, nodes: Vec<String>) -> Self {
        let nodes = if nodes.is_empty() { self.nodes.clone() } else { nodes };
        self.profile_associations.push(ProfileAssociation {
            profile_name: profile_name.into(),
            nodes,
        });
        self
    }
}


// ── Monitoring profiles ─────────────────────────────────────────────

/// Consumption sampling periods accepted on m3 and a8 nodes, in µs.
pub const PERIODS_US: [u32; 8] = [140, 204, 332, 588, 1100, 2116, 4156, 8244];
/// Consumption averaging windows accepted on m3 and a8 nodes.
pub const AVERAGES: [u32; 8] = [1, 4, 16, 64, 128, 256, 512, 1024];
/// Consumption sampling frequencies accepted on wsn430 nodes, in ms.
pub const WSN430_CONSUMPTION_FREQUENCIES_MS: [u32; 5] = [5000, 1000, 500, 100, 70];
pub const WSN430_RADIO_FREQUENCIES_MS: [u32; 3] = [5000, 1000, 500];
pub const WSN430_SENSOR_FREQUENCIES_MS: [u32; 4] = [30000, 10000, 5000, 1000];

/// Node hardware a profile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeArch {
    Wsn430,
    M3,
    A8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerMode {
    #[default]
    Dc,
    Battery,
}

/// Which electrical quantities a consumption measure records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Measures {
    pub power: bool,
    pub voltage: bool,
    pub current: bool,
}

impl Measures {
    pub fn any(self) -> bool {
        self.power || self.voltage || self.current
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Consumption {
    /// m3 and a8.
    Periodic {
        period: u32,
        average: u32,
        #[serde(flatten)]
        measures: Measures,
    },
    /// wsn430.
    Sampled {
        frequency: u32,
        #[serde(flatten)]
        measures: Measures,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioMode {
    Rssi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Radio {
    /// m3 and a8: RSSI sweeps over IEEE 802.15.4 channels.
    Rssi {
        mode: RadioMode,
        channels: Vec<u8>,
        period: u32,
        num_per_channel: u8,
    },
    /// wsn430.
    Sampled { frequency: u32 },
}

/// wsn430 environment sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sensor {
    pub frequency: u32,
    pub temperature: bool,
    pub luminosity: bool,
}

/// A monitoring profile, serialized the way `POST profiles/{name}` expects.
///
/// Each `with_*` step validates its values against the node architecture
/// and leaves the section unset when nothing in it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    #[serde(rename = "profilename")]
    name: String,
    #[serde(rename = "nodearch")]
    arch: NodeArch,
    power: PowerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumption: Option<Consumption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radio: Option<Radio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor: Option<Sensor>,
}

impl Profile {
    pub fn new(name: impl Into<String>, arch: NodeArch, power: PowerMode) -> Self {
        Self {
            name: name.into(),
            arch,
            power,
            consumption: None,
            radio: None,
            sensor: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arch(&self) -> NodeArch {
        self.arch
    }

    /// m3/a8 consumption: `period` from [`PERIODS_US`], `average` from
    /// [`AVERAGES`].
    pub fn with_consumption(
        mut self,
        measures: Measures,
        period: Option<u32>,
        average: Option<u32>,
    ) -> Result<Self, Error> {
        self.require_arch("consumption", &[NodeArch::M3, NodeArch::A8])?;
        if !measures.any() {
            return Ok(self);
        }
        self.consumption = Some(Consumption::Periodic {
            period: one_of("consumption period", period, &PERIODS_US)?,
            average: one_of("consumption average", average, &AVERAGES)?,
            measures,
        });
        Ok(self)
    }

    /// m3/a8 RSSI measure on `channels` (11 to 26) every `period`
    /// (1 to 65535).
    pub fn with_rssi(
        mut self,
        channels: Vec<u8>,
        period: Option<u32>,
        num_per_channel: u8,
    ) -> Result<Self, Error> {
        self.require_arch("radio", &[NodeArch::M3, NodeArch::A8])?;
        if channels.is_empty() {
            return Err(contract("radio channels", "at least one channel is required"));
        }
        if let Some(bad) = channels.iter().find(|c| !(11..=26).contains(*c)) {
            return Err(contract("radio channels", format!("{bad} is not in 11..=26")));
        }
        let period = match period {
            Some(p @ 1..=65535) => p,
            Some(p) => return Err(contract("radio period", format!("{p} is not in 1..=65535"))),
            None => return Err(contract("radio period", "required for rssi")),
        };
        self.radio = Some(Radio::Rssi {
            mode: RadioMode::Rssi,
            channels,
            period,
            num_per_channel,
        });
        Ok(self)
    }

    /// wsn430 consumption sampled every `frequency` ms.
    pub fn with_sampled_consumption(
        mut self,
        measures: Measures,
        frequency: Option<u32>,
    ) -> Result<Self, Error> {
        self.require_arch("consumption", &[NodeArch::Wsn430])?;
        if !measures.any() {
            return Ok(self);
        }
        self.consumption = Some(Consumption::Sampled {
            frequency: one_of(
                "consumption frequency",
                frequency,
                &WSN430_CONSUMPTION_FREQUENCIES_MS,
            )?,
            measures,
        });
        Ok(self)
    }

    /// wsn430 radio sampled every `frequency` ms; `None` leaves radio off.
    pub fn with_radio_frequency(mut self, frequency: Option<u32>) -> Result<Self, Error> {
        self.require_arch("radio", &[NodeArch::Wsn430])?;
        if frequency.is_some() {
            self.radio = Some(Radio::Sampled {
                frequency: one_of("radio frequency", frequency, &WSN430_RADIO_FREQUENCIES_MS)?,
            });
        }
        Ok(self)
    }

    pub fn with_sensors(
        mut self,
        frequency: Option<u32>,
        temperature: bool,
        luminosity: bool,
    ) -> Result<Self, Error> {
        self.require_arch("sensor", &[NodeArch::Wsn430])?;
        if !(temperature || luminosity) {
            return Ok(self);
        }
        self.sensor = Some(Sensor {
            frequency: one_of("sensor frequency", frequency, &WSN430_SENSOR_FREQUENCIES_MS)?,
            temperature,
            luminosity,
        });
        Ok(self)
    }

    fn require_arch(&self, section: &str, supported: &[NodeArch]) -> Result<(), Error> {
        if supported.contains(&self.arch) {
            Ok(())
        } else {
            Err(contract(section, format!("not available on {} nodes", self.arch)))
        }
    }
}

fn one_of(argument: &str, value: Option<u32>, allowed: &[u32]) -> Result<u32, Error> {
    match value {
        Some(v) if allowed.contains(&v) => Ok(v),
        Some(v) => Err(contract(argument, format!("{v} is not one of {allowed:?}"))),
        None => Err(contract(argument, format!("required, one of {allowed:?}"))),
    }
}

fn contract(argument: &str, reason: impl Into<String>) -> Error {
    Error::Contract {
        argument: argument.into(),
        reason: reason.into(),
    }
}
