//! Candela Demo — drives the viewing session from the command line against
//! the software renderer.
//!
//! Accepts the viewer's activation syntax (`-f`, `-h`, `-forcebt2100`,
//! `-input:<path>`, `-colorprofile:...`, `-rendereffect:...`) and reports
//! the loaded image's characteristics and the resolved render options.

use std::process::ExitCode;
use std::sync::Arc;

use candela_core::color::AdvancedColorKind;
use candela_core::display::AdvancedColorInfo;
use candela_core::render::exposure;
use candela_session::image_backend::{HostPlatform, ImageCrateDecoder};
use candela_session::launch::LaunchErrorFlags;
use candela_session::session::Session;
use candela_session::software::SoftwareRenderer;
use candela_session::SessionHandle;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let config = candela_session::launch::parse_args(&args);

    report_launch_diagnostics(&config.error_flags, config.error_filename.as_deref());

    let initial_file = config.initial_file.clone();
    let Some(path) = initial_file else {
        eprintln!("usage: candela-demo -input:<image> [-f] [-h] [-forcebt2100] [-rendereffect:<name>]");
        return ExitCode::FAILURE;
    };

    let mut session = Session::new(SoftwareRenderer::new());
    session.on_launch(config);
    // Without a display subsystem, assume a plain SDR monitor.
    session.on_display_changed(AdvancedColorInfo::with_kind(
        AdvancedColorKind::StandardDynamicRange,
    ));

    let handle = SessionHandle::new(
        session,
        Arc::new(ImageCrateDecoder::new()),
        Arc::new(HostPlatform::modern()),
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(handle.load_image(path)) {
        Ok(_) => {}
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{}", error.remediation());
            return ExitCode::FAILURE;
        }
    }

    handle.with_session(|session| {
        let image = session.current_image().expect("load succeeded");
        println!("{}", image.name);
        println!("  Kind:          {}", image.info.image_kind);
        println!("  Bit depth:     {} bpc", image.info.bits_per_channel);
        println!("  Float:         {}", if image.info.is_float { "Yes" } else { "No" });
        println!(
            "  Color profile: {}",
            if image.info.num_profiles > 0 { "Yes" } else { "No" }
        );
        println!(
            "  Size:          {}x{}",
            image.info.size.x as u32, image.info.size.y as u32
        );

        if image.cll.max_nits < 0.0 {
            println!("  MaxCLL:        N/A");
            println!("  MedCLL:        N/A");
        } else {
            println!("  MaxCLL:        {:.1} nits", image.cll.max_nits);
            println!("  MedCLL:        {:.1} nits", image.cll.med_nits);
        }

        let options = session.current_render_options().expect("options resolved");
        println!("Render options");
        println!("  Effect:        {}", options.effect.label());
        if options.exposure_applicable {
            println!(
                "  Exposure:      {}",
                exposure::format_exposure_percent(
                    exposure::exposure_to_slider(options.sdr_exposure as f64)
                )
            );
        } else {
            println!("  Exposure:      n/a for SDR/WCG content");
        }
        println!(
            "  Target peak:   {:.0} nits",
            options.effective_display_max_nits()
        );
    });

    ExitCode::SUCCESS
}

fn report_launch_diagnostics(flags: &LaunchErrorFlags, error_filename: Option<&str>) {
    if flags.contains(LaunchErrorFlags::INVALID_CMD_ARGS) {
        eprintln!("warning: unrecognized or malformed command-line arguments were ignored");
    }
    if flags.contains(LaunchErrorFlags::INVALID_FILE) {
        eprintln!(
            "warning: input file not found: {}",
            error_filename.unwrap_or("<unknown>")
        );
    }
}
