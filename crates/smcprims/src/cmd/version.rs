use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("smcprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: smcprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SMCPRIMS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: client={}, iokit={}, cli=true",
        cfg!(feature = "client"),
        cfg!(target_os = "macos")
    );

    #[cfg(target_os = "macos")]
    match smcprims_channel::machine_model() {
        Ok(model) => println!("machine: {model}"),
        Err(_) => println!("machine: unknown"),
    }

    Ok(SUCCESS)
}
