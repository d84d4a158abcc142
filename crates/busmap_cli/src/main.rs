mod http;
mod report;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use busmap_core::{
    ingest, load_static_feeds, FeedRequest, FeedSource, FeedStatus, FileSource, LatLon,
    Rectangle, SharedNetwork, StaticFeedDir, StopNo, DEFAULT_SEARCH_RADIUS_METERS,
};

use crate::http::{arrivals_url, build_client, buses_url, HttpSource, DEFAULT_API_BASE};
use crate::report::{FeedReport, NearestStopReport, Report, SelectedStopReport};

#[derive(Debug, Parser)]
#[command(name = "busmap")]
#[command(about = "Load transit feeds, then query stops, arrivals and bus positions")]
struct Args {
    /// Directory holding stops.json, routes.json and allroutemaps.txt
    #[arg(short = 'd', long = "data-dir", default_value = ".")]
    data_dir: PathBuf,

    #[arg(long = "stops")]
    stops: Option<PathBuf>,

    #[arg(long = "routes")]
    routes: Option<PathBuf>,

    #[arg(long = "route-maps")]
    route_maps: Option<PathBuf>,

    /// Stop to select and load real-time feeds for
    #[arg(short = 's', long = "stop")]
    stop: Option<StopNo>,

    /// Find the nearest stop to LAT,LON
    #[arg(long = "near", allow_hyphen_values = true)]
    near: Option<LatLon>,

    #[arg(long = "radius", default_value_t = DEFAULT_SEARCH_RADIUS_METERS)]
    radius: f64,

    /// Clip the selected stop's route patterns to NW_LAT,NW_LON,SE_LAT,SE_LON
    #[arg(long = "viewport", value_parser = parse_viewport, allow_hyphen_values = true)]
    viewport: Option<Rectangle>,

    /// Arrival estimates payload for --stop
    #[arg(long = "arrivals")]
    arrivals: Option<PathBuf>,

    /// Bus positions payload for --stop
    #[arg(long = "buses")]
    buses: Option<PathBuf>,

    /// Fetch arrivals and bus positions for --stop over HTTP
    #[arg(long = "live")]
    live: bool,

    #[arg(long = "api-key", env = "TRANSLINK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long = "api-base", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Write the JSON report here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    #[arg(short = 'p', long = "pretty")]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    check_args(&args)?;

    let network = SharedNetwork::default();
    let static_dir = static_feed_dir(&args);
    info!("loading static feeds from {}", args.data_dir.display());
    let static_outcomes = load_static_feeds(&network, &static_dir);
    let failed_static: Vec<String> = static_outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome.status,
                FeedStatus::Malformed | FeedStatus::Unavailable
            )
        })
        .map(|outcome| outcome.feed.to_string())
        .collect();
    let mut feeds: Vec<FeedReport> = static_outcomes.into_iter().map(FeedReport::from).collect();

    if let Some(stop) = args.stop {
        for (request, source) in realtime_sources(&args, stop)? {
            feeds.push(ingest(&network, source.as_ref(), request).into());
        }
        network
            .write()
            .stops
            .select(stop)
            .with_context(|| format!("select stop {}", stop))?;
    }

    let report = {
        let network = network.read();
        let mut report = Report::new(&network, feeds);
        report.nearest = args
            .near
            .map(|point| NearestStopReport::build(&network, point, args.radius));
        report.selected_stop = network
            .stops
            .selected()
            .map(|stop| SelectedStopReport::build(&network, stop, args.viewport));
        report
    };
    report.write_json_with_format(args.output.as_deref(), args.pretty)?;

    if !failed_static.is_empty() {
        bail!("static feeds failed to load: {}", failed_static.join(", "));
    }
    Ok(())
}

fn check_args(args: &Args) -> anyhow::Result<()> {
    let wants_realtime = args.live || args.arrivals.is_some() || args.buses.is_some();
    if wants_realtime && args.stop.is_none() {
        bail!("--arrivals, --buses and --live require --stop");
    }
    if args.live && (args.arrivals.is_some() || args.buses.is_some()) {
        bail!("--live cannot be combined with --arrivals or --buses");
    }
    if args.live && args.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
        bail!("--live requires --api-key or TRANSLINK_API_KEY");
    }
    if !(args.radius > 0.0) {
        bail!("--radius must be a positive number of meters");
    }
    Ok(())
}

fn static_feed_dir(args: &Args) -> StaticFeedDir {
    let mut dir = StaticFeedDir::new(&args.data_dir);
    if let Some(path) = args.stops.clone() {
        dir = dir.with_stops(path);
    }
    if let Some(path) = args.routes.clone() {
        dir = dir.with_routes(path);
    }
    if let Some(path) = args.route_maps.clone() {
        dir = dir.with_route_maps(path);
    }
    dir
}

fn realtime_sources(
    args: &Args,
    stop: StopNo,
) -> anyhow::Result<Vec<(FeedRequest, Box<dyn FeedSource>)>> {
    let mut sources: Vec<(FeedRequest, Box<dyn FeedSource>)> = Vec::new();
    if args.live {
        let api_key = args.api_key.as_deref().unwrap_or_default();
        let client = build_client()?;
        sources.push((
            FeedRequest::Arrivals(stop),
            Box::new(HttpSource::new(
                client.clone(),
                arrivals_url(&args.api_base, api_key, stop),
                format!("{}/stops/{}/estimates", args.api_base, stop),
            )),
        ));
        sources.push((
            FeedRequest::Buses(stop),
            Box::new(HttpSource::new(
                client,
                buses_url(&args.api_base, api_key, stop),
                format!("{}/buses?stopNo={}", args.api_base, stop),
            )),
        ));
        return Ok(sources);
    }
    if let Some(path) = args.arrivals.as_ref() {
        sources.push((FeedRequest::Arrivals(stop), Box::new(FileSource::new(path))));
    }
    if let Some(path) = args.buses.as_ref() {
        sources.push((FeedRequest::Buses(stop), Box::new(FileSource::new(path))));
    }
    Ok(sources)
}

fn parse_viewport(value: &str) -> Result<Rectangle, String> {
    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|err| format!("invalid viewport {}: {}", value, err))?;
    match numbers.as_slice() {
        [nw_lat, nw_lon, se_lat, se_lon] => Ok(Rectangle::new(
            LatLon::new(*nw_lat, *nw_lon),
            LatLon::new(*se_lat, *se_lon),
        )),
        _ => Err(format!(
            "invalid viewport {}: expected NW_LAT,NW_LON,SE_LAT,SE_LON",
            value
        )),
    }
}
