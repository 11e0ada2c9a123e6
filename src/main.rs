use videoport_hal::{
    load_profile, AuthOutcome, CapabilityTable, HdcpProtocol, PortHandle, PortRegistry, PortType,
};

fn print_usage() {
    println!("videoport-hal - Video Output Port Inspector\n");
    println!("USAGE:");
    println!("    videoport-hal [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --profile <FILE>            Load a TOML capability profile");
    println!("                                (default: built-in HDMI + panel profile)\n");
    println!("    --ports                     List the platform's video ports\n");
    println!("    --capabilities <PORT>       Show the capability table entry for a port");
    println!("                                PORT is <type>:<index>, e.g. hdmi:0\n");
    println!("    --output-settings <PORT>    Show the port's current output settings\n");
    println!("    --simulate-hdcp <PORT>      Enable the port, run an HDCP handshake,");
    println!("                                and print every status transition\n");
    println!("    --help, -h                  Show this help message\n");
    println!("EXAMPLES:");
    println!("    videoport-hal --ports");
    println!("    videoport-hal --capabilities hdmi:0");
    println!("    videoport-hal --profile platform.toml --simulate-hdcp hdmi:0");
    println!("    videoport-hal --output-settings internal:0");
}

/// Parse a `<type>:<index>` port selector, e.g. "hdmi:0".
fn parse_port_selector(s: &str) -> Option<(PortType, i32)> {
    let (type_str, index_str) = s.split_once(':')?;
    let port_type = PortType::from_str(type_str)?;
    let index = index_str.parse::<i32>().ok()?;
    Some((port_type, index))
}

fn list_ports(registry: &PortRegistry) {
    println!("Platform video ports:");
    for cap in registry.capability_table().ports() {
        let hdcp = match cap.hdcp.max_protocol() {
            Some(max) => format!("HDCP up to {}", max),
            None => "no HDCP".to_string(),
        };
        println!(
            "    {}:{}  {:<10} {:?} role, {} resolutions, {}",
            cap.port_type.to_string().to_lowercase().replace(' ', "-"),
            cap.index,
            cap.name,
            cap.role(),
            cap.supported_resolutions.len(),
            hdcp,
        );
    }
}

fn show_capabilities(registry: &PortRegistry, port_type: PortType, index: i32, handle: PortHandle) {
    let slot = registry
        .capability_table()
        .ports()
        .iter()
        .find(|c| c.port_type == port_type && c.index == index as u32);
    let Some(cap) = slot else { return };

    println!("{} ({}:{})", cap.name, port_type, index);
    println!("    Role: {:?}", cap.role());
    println!("    Default resolution: {}", cap.default_resolution);
    println!("    Supported resolutions:");
    for r in &cap.supported_resolutions {
        let scan = if r.interlaced { "interlaced" } else { "progressive" };
        println!("        {:<10} {} {} ({})", r.name, r.pixel_resolution, r.aspect_ratio, scan);
    }
    print!("    Color spaces:");
    for cs in &cap.color_spaces {
        print!(" {}", cs);
    }
    println!();
    print!("    Color depths:");
    for cd in &cap.color_depths {
        print!(" {}", cd);
    }
    println!();
    print!("    HDR standards:");
    for h in &cap.hdr_standards {
        print!(" {}", h);
    }
    println!();
    println!("    TV resolutions: 0x{:06x}", registry.supported_tv_resolutions(handle)
        .map(|t| t.bits())
        .unwrap_or(0));
    match cap.hdcp.max_protocol() {
        Some(max) => println!("    HDCP: supported, platform max {}", max),
        None => println!("    HDCP: not supported"),
    }
    println!("    Surround: {} ({})", cap.display_surround, cap.surround_mode);
}

fn show_output_settings(
    registry: &PortRegistry,
    handle: PortHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = registry.get_current_output_settings(handle)?;
    println!("Current output settings:");
    println!("    Resolution: {}", registry.get_resolution(handle)?);
    println!("    EOTF: {}", settings.video_eotf);
    println!("    Matrix coefficients: {}", settings.matrix_coefficients);
    println!("    Color space: {}", settings.color_space);
    println!("    Color depth: {}", settings.color_depth);
    println!("    Quantization range: {}", settings.quantization_range);
    println!("    HDR output: {}", registry.is_output_hdr(handle)?);
    Ok(())
}

fn simulate_hdcp(
    registry: &mut PortRegistry,
    handle: PortHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    registry.register_hdcp_status_callback(
        handle,
        Box::new(|_, status| {
            println!("    HDCP status -> {}", status);
        }),
    )?;

    println!("Enabling port...");
    registry.enable_port(handle, true)?;
    println!("Connecting display (peer advertises {})...", HdcpProtocol::Hdcp2x);
    registry.notify_display_connected(handle, Some(HdcpProtocol::Hdcp2x))?;
    println!("Starting HDCP authentication...");
    registry.enable_hdcp(handle, true)?;
    registry.resolve_hdcp_authentication(handle, AuthOutcome::Success)?;

    println!("Final status: {}", registry.get_hdcp_status(handle)?);
    match registry.get_hdcp_current_protocol(handle)? {
        Some(p) => println!("Negotiated protocol: {}", p),
        None => println!("Negotiated protocol: none"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage();
        return Ok(());
    }

    // --profile may appear anywhere; resolve it before the action flags.
    let mut table = CapabilityTable::default_profile();
    if let Some(pos) = args.iter().position(|a| a == "--profile") {
        let Some(path) = args.get(pos + 1) else {
            eprintln!("Error: --profile requires a value");
            return Err("Missing argument value".into());
        };
        table = load_profile(path)?;
    }

    let mut registry = PortRegistry::new(table);
    registry.init()?;

    let mut i = 1;
    let mut acted = false;

    while i < args.len() {
        match args[i].as_str() {
            "--profile" => {
                // Already handled above.
                i += 2;
            }
            "--ports" => {
                list_ports(&registry);
                acted = true;
                i += 1;
            }
            "--capabilities" | "--output-settings" | "--simulate-hdcp" => {
                let flag = args[i].as_str();
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires a value", flag);
                    return Err("Missing argument value".into());
                };
                let Some((port_type, index)) = parse_port_selector(value) else {
                    eprintln!("Error: Invalid port selector '{}' for {}", value, flag);
                    eprintln!("Expected <type>:<index>, e.g. hdmi:0");
                    return Err("Invalid argument".into());
                };
                let handle = registry.get_port(port_type, index)?;
                match flag {
                    "--capabilities" => show_capabilities(&registry, port_type, index, handle),
                    "--output-settings" => show_output_settings(&registry, handle)?,
                    "--simulate-hdcp" => simulate_hdcp(&mut registry, handle)?,
                    _ => unreachable!(),
                }
                acted = true;
                i += 2;
            }
            arg => {
                eprintln!("Error: Unknown option '{}'", arg);
                print_usage();
                return Err("Invalid argument".into());
            }
        }
    }

    if !acted {
        print_usage();
    }

    registry.term()?;
    Ok(())
}
