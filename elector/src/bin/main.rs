use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use elector::configuration::{Configuration, NodeConfiguration};
use elector::group::grpc::GrpcElectionGroup;
use elector::group::local::LocalElectionGroupBuilder;
use elector::raft::election::store::{FileStore, InMemoryStore};
use elector::types::NodeId;
use std::error::Error;
use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt::format::DefaultFields, EnvFilter};

const SIMULATION_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let formatter = DefaultFields::new().delimited(",");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .fmt_fields(formatter)
        .init();

    let matches = App::new("elector")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("serve")
                .about("Runs a node of a three-node cluster on localhost")
                .arg(Arg::with_name("id").index(1).required(true))
                .arg(
                    Arg::with_name("data-dir")
                        .long("data-dir")
                        .takes_value(true)
                        .help("Directory of the election state [default: current directory]"),
                ),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Elects a leader among in-process nodes and prints their state")
                .arg(
                    Arg::with_name("nodes")
                        .long("nodes")
                        .takes_value(true)
                        .default_value("5"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("serve", Some(m)) => serve(m).await,
        ("simulate", Some(m)) => simulate(m).await,
        _ => Ok(()),
    }
}

async fn serve(matches: &ArgMatches<'_>) -> Result<(), Box<dyn Error>> {
    let id: NodeId = matches.value_of("id").unwrap_or_default().parse()?;

    let mut conf = Configuration::default();
    let ip = "::1".parse::<Ipv6Addr>()?;
    let nodes = &mut conf.group.nodes;
    nodes.insert(1, NodeConfiguration::new(ip, 50051, 60051));
    nodes.insert(2, NodeConfiguration::new(ip, 50052, 60052));
    nodes.insert(3, NodeConfiguration::new(ip, 50053, 60053));

    let data_dir = matches
        .value_of("data-dir")
        .map(PathBuf::from)
        .or_else(|| conf.persistence.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&data_dir).await?;
    let store = FileStore::new(&data_dir, id);

    let group = GrpcElectionGroup::new(id, conf, store);
    group.run().await?;

    Ok(())
}

async fn simulate(matches: &ArgMatches<'_>) -> Result<(), Box<dyn Error>> {
    let n: usize = matches.value_of("nodes").unwrap_or("5").parse()?;

    let group = LocalElectionGroupBuilder::new()
        .confs(vec![Configuration::default(); n])
        .stores((0..n).map(|_| InMemoryStore::default()).collect())
        .build()
        .spawn()
        .await;

    let leader = tokio::time::timeout(SIMULATION_TIMEOUT, group.wait_for_leader()).await??;
    group.announce_leader(&leader).await?;

    for node in group.nodes() {
        let status = node.status();
        let voted_for = status
            .voted_for
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_owned());
        println!(
            "id={} term={} voted_for={} role={:?}",
            status.id, status.term, voted_for, status.role
        );
    }

    group.shutdown().await;
    Ok(())
}
