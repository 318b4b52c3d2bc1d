use clap::Parser;
use glidernet::cli::Cli;
use glidernet::config::ApplicationConfig;
use glidernet::connection::AprsClient;
use glidernet::connection::resolver::resolve_ipv4;
use glidernet::event::ClientEvent;
use glidernet::logging::setup_logging;
use glidernet::thread_manager::ThreadManager;
use log::info;

const EVENT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.logging_level);

    let application_config = match ApplicationConfig::construct_from_path(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    info!("Main: Application started.");

    let mut connection_config = application_config.glidernet;
    if application_config.resolve_host {
        match resolve_ipv4(&connection_config.host) {
            Ok(address) => {
                info!("Resolved {} to {address}", connection_config.host);
                connection_config.host = address.to_string();
            }
            Err(e) => {
                log::error!("{e}");
                return std::process::ExitCode::FAILURE;
            }
        }
    }

    let (event_sender, event_receiver): (
        crossbeam_channel::Sender<ClientEvent>,
        crossbeam_channel::Receiver<ClientEvent>,
    ) = crossbeam_channel::unbounded();

    let client = AprsClient::new(connection_config, application_config.client, event_sender);

    let mut thread_manager = ThreadManager::new();
    let client_task_id = match thread_manager.add_task(client, "aprs-client") {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to start client thread: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let deadline = cli
        .duration
        .map(|seconds| std::time::Instant::now() + std::time::Duration::from_secs(seconds));

    loop {
        if deadline.is_some_and(|deadline| std::time::Instant::now() >= deadline) {
            break;
        }
        match event_receiver.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(event) => log_event(&event),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                log::error!("Main: client stopped unexpectedly.");
                break;
            }
        }
    }

    thread_manager.stop_all_tasks();
    thread_manager.wait_on_task_finish(client_task_id);

    info!("Main: Program finished.");
    std::process::ExitCode::SUCCESS
}

fn log_event(event: &ClientEvent) {
    match event {
        ClientEvent::Position(position) => info!(
            "{0} -> {1}: {2:.5} {3:.5} track {4:03} speed {5} alt {6}ft vs {7}fpm FL{8:03}",
            position.header.source,
            position.header.destination,
            position.body.latitude,
            position.body.longitude,
            position.body.ground_track,
            position.body.ground_speed,
            position.body.altitude,
            position.body.vertical_speed,
            position.body.flight_level,
        ),
        ClientEvent::Connected => info!("Connected."),
        ClientEvent::Closed => log::warn!("Connection closed, reconnecting."),
        ClientEvent::KeepAlive(line) => log::debug!("Keepalive: {line}"),
        ClientEvent::Packet(line) => log::debug!("Unparsed: {line}"),
        ClientEvent::Sent(line) => log::debug!("Sent: {}", line.trim_end()),
    }
}
