//! Profile command handlers.

use serde_json::Value;

use iotlab_api::{Api, Measures, NodeArch, PowerMode, Profile};

use crate::cli::{
    GlobalOpts, M3ProfileArgs, MeasureArg, OutputFormat, PowerArg, ProfileArgs, ProfileBase,
    ProfileCommand, Wsn430ProfileArgs,
};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    api: &Api,
    args: ProfileArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Get { name: Some(name), .. } => {
            let profile = api.get_profile(&name).await?;
            output::print_output(&output::render_value(format, &profile)?, global.quiet);
        }

        ProfileCommand::Get { name: None, .. } => {
            let profiles = api.get_profiles().await?;
            output::print_output(&output::render_value(format, &profiles)?, global.quiet);
        }

        ProfileCommand::Del { name } => {
            let confirmation = api.del_profile(&name).await?;
            output::print_output(&confirmation, global.quiet);
        }

        ProfileCommand::Load { file } => {
            let profile = util::read_json_file(&file, "file")?;
            let name = profile_name(&profile)?;
            let confirmation = api.add_profile(name, &profile).await?;
            output::print_output(&confirmation, global.quiet);
        }

        ProfileCommand::AddM3(args) => {
            let json = args.base.json;
            add(api, &m3_a8_profile(NodeArch::M3, &args)?, json, global, format).await?;
        }

        ProfileCommand::AddA8(args) => {
            let json = args.base.json;
            add(api, &m3_a8_profile(NodeArch::A8, &args)?, json, global, format).await?;
        }

        ProfileCommand::AddWsn430(args) => {
            let json = args.base.json;
            add(api, &wsn430_profile(&args)?, json, global, format).await?;
        }
    }
    Ok(())
}

/// Upload `profile`, or just print it with `--json`.
async fn add(
    api: &Api,
    profile: &Profile,
    json_only: bool,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    if json_only {
        let value = serde_json::to_value(profile)?;
        output::print_output(&output::render_value(format, &value)?, global.quiet);
        return Ok(());
    }
    let confirmation = api.add_profile(profile.name(), profile).await?;
    output::print_output(&confirmation, global.quiet);
    Ok(())
}

fn m3_a8_profile(arch: NodeArch, args: &M3ProfileArgs) -> Result<Profile, CliError> {
    let mut profile = base_profile(arch, &args.base).with_consumption(
        measures(&args.base.consumption),
        args.period,
        args.average,
    )?;
    if args.rssi {
        profile = profile.with_rssi(args.channels.clone(), args.rperiod, args.num_per_channel)?;
    }
    Ok(profile)
}

fn wsn430_profile(args: &Wsn430ProfileArgs) -> Result<Profile, CliError> {
    Ok(base_profile(NodeArch::Wsn430, &args.base)
        .with_sampled_consumption(measures(&args.base.consumption), args.cfreq)?
        .with_radio_frequency(args.rfreq)?
        .with_sensors(args.sfreq, args.temperature, args.luminosity)?)
}

fn base_profile(arch: NodeArch, base: &ProfileBase) -> Profile {
    let power = match base.power {
        PowerArg::Dc => PowerMode::Dc,
        PowerArg::Battery => PowerMode::Battery,
    };
    Profile::new(base.name.clone(), arch, power)
}

fn measures(selected: &[MeasureArg]) -> Measures {
    Measures {
        power: selected.contains(&MeasureArg::Power),
        voltage: selected.contains(&MeasureArg::Voltage),
        current: selected.contains(&MeasureArg::Current),
    }
}

/// The `profilename` a profile document is stored under.
fn profile_name(profile: &Value) -> Result<&str, CliError> {
    profile
        .get("profilename")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: "profile JSON has no 'profilename'".into(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use serde_json::json;

    use super::*;
    use crate::cli::{Cli, Command};

    fn parse_profile(args: &[&str]) -> ProfileCommand {
        let cli = Cli::try_parse_from([&["iotlab", "profile"][..], args].concat()).unwrap();
        match cli.command {
            Command::Profile(profile) => profile.command,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn m3_flags_build_profile() {
        let ProfileCommand::AddM3(args) = parse_profile(&[
            "addm3", "-n", "mon", "--power", "battery", "--consumption", "power,current",
            "--period", "1100", "--avg", "64", "--rssi", "--channels", "11,26", "--rperiod", "5",
        ]) else {
            panic!("expected addm3");
        };
        let value = serde_json::to_value(m3_a8_profile(NodeArch::M3, &args).unwrap()).unwrap();

        assert_eq!(value["nodearch"], json!("m3"));
        assert_eq!(value["power"], json!("battery"));
        assert_eq!(value["consumption"]["voltage"], json!(false));
        assert_eq!(value["consumption"]["current"], json!(true));
        assert_eq!(value["radio"]["channels"], json!([11, 26]));
        assert_eq!(value["radio"]["num_per_channel"], json!(0));
    }

    #[test]
    fn out_of_range_period_is_a_validation_error() {
        let ProfileCommand::AddA8(args) =
            parse_profile(&["adda8", "-n", "p", "--consumption", "power", "--period", "100", "--avg", "1"])
        else {
            panic!("expected adda8");
        };
        let err = m3_a8_profile(NodeArch::A8, &args).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "{err:?}");
    }

    #[test]
    fn rssi_needs_channels() {
        let cli = Cli::try_parse_from(["iotlab", "profile", "addm3", "-n", "p", "--rssi"]);
        assert!(cli.is_err());
    }

    #[test]
    fn wsn430_flags_build_profile() {
        let ProfileCommand::AddWsn430(args) = parse_profile(&[
            "addwsn430", "-n", "env", "--sfreq", "1000", "--temperature", "--rfreq", "500",
        ]) else {
            panic!("expected addwsn430");
        };
        let value = serde_json::to_value(wsn430_profile(&args).unwrap()).unwrap();

        assert_eq!(value["nodearch"], json!("wsn430"));
        assert_eq!(value["power"], json!("dc"));
        assert!(value.get("consumption").is_none());
        assert_eq!(value["radio"], json!({"frequency": 500}));
        assert_eq!(value["sensor"]["luminosity"], json!(false));
    }

    #[test]
    fn name_comes_from_document() {
        let profile = json!({"profilename": "consumption", "power": "dc"});
        assert_eq!(profile_name(&profile).unwrap(), "consumption");
    }

    #[test]
    fn missing_name_is_rejected() {
        assert!(profile_name(&json!({"power": "dc"})).is_err());
        assert!(profile_name(&json!({"profilename": ""})).is_err());
    }
}
