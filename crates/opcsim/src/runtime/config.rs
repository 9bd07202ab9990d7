use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub endpoint: String,
    pub namespace_uri: String,
    pub equipment_count: usize,
    pub tick_interval: Duration,
    pub run_seconds: Option<u64>,
    pub seed: Option<u64>,
    pub json_logs: bool,
    pub metrics_addr: Option<String>,
    pub audit_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            endpoint: "opc.tcp://127.0.0.1:4841/freeopcua/server/".to_string(),
            namespace_uri: "http://examples.freeopcua.github.io".to_string(),
            equipment_count: 5,
            tick_interval: Duration::from_secs(1),
            run_seconds: None,
            seed: None,
            json_logs: false,
            metrics_addr: None,
            audit_path: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--endpoint" => {
                    if i + 1 < args.len() {
                        cfg.endpoint = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--namespace-uri" => {
                    if i + 1 < args.len() {
                        cfg.namespace_uri = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--equipment" => {
                    if i + 1 < args.len() {
                        if let Ok(count) = args[i + 1].parse::<usize>() {
                            cfg.equipment_count = count;
                        }
                        i += 1;
                    }
                }
                "--tick-interval-ms" => {
                    if i + 1 < args.len() {
                        if let Ok(ms) = args[i + 1].parse::<u64>() {
                            cfg.tick_interval = Duration::from_millis(ms);
                        }
                        i += 1;
                    }
                }
                "--run-seconds" => {
                    if i + 1 < args.len() {
                        cfg.run_seconds = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--seed" => {
                    if i + 1 < args.len() {
                        cfg.seed = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--metrics-addr" => {
                    if i + 1 < args.len() {
                        cfg.metrics_addr = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--audit-log" => {
                    if i + 1 < args.len() {
                        cfg.audit_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    pub fn print_help() {
        println!(
            r#"opcsim - OPC UA server with simulated equipment tags

USAGE:
    opcsim [OPTIONS]

OPTIONS:
    --endpoint <URL>        OPC UA endpoint URL [default: opc.tcp://127.0.0.1:4841/freeopcua/server/]
    --namespace-uri <URI>   Namespace registered for the simulation nodes
                            [default: http://examples.freeopcua.github.io]
    --equipment <N>         Number of simulated equipment objects [default: 5]
    --tick-interval-ms <MS> Delay between update ticks [default: 1000]
    --run-seconds <SECS>    Run for a fixed duration then exit
    --seed <U64>            Seed the tag generator for a reproducible run
    --json-logs             Output logs in JSON format (for log aggregation)
    --metrics-addr <ADDR>   Enable Prometheus metrics server on address (e.g., 0.0.0.0:9090)
    --audit-log <PATH>      Enable lifecycle audit logging to specified JSONL file
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log filter (e.g., RUST_LOG=debug,opcsim=trace)

EXAMPLES:
    # Default demo: five equipment, one tick per second
    opcsim

    # Reproducible short run with metrics
    opcsim --seed 42 --run-seconds 10 --metrics-addr 0.0.0.0:9090
"#
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RuntimeConfig {
        let mut full = vec!["opcsim".to_string()];
        full.extend(args.iter().map(|a| a.to_string()));
        RuntimeConfig::from_args(&full)
    }

    #[test]
    fn defaults_match_the_demo_surface() {
        let cfg = parse(&[]);
        assert_eq!(cfg.endpoint, "opc.tcp://127.0.0.1:4841/freeopcua/server/");
        assert_eq!(cfg.namespace_uri, "http://examples.freeopcua.github.io");
        assert_eq!(cfg.equipment_count, 5);
        assert_eq!(cfg.tick_interval, Duration::from_secs(1));
        assert!(cfg.run_seconds.is_none());
        assert!(cfg.seed.is_none());
        assert!(!cfg.json_logs);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = parse(&[
            "--endpoint",
            "opc.tcp://0.0.0.0:4840",
            "--equipment",
            "2",
            "--tick-interval-ms",
            "250",
            "--seed",
            "42",
            "--json-logs",
            "--audit-log",
            "/tmp/audit.jsonl",
        ]);
        assert_eq!(cfg.endpoint, "opc.tcp://0.0.0.0:4840");
        assert_eq!(cfg.equipment_count, 2);
        assert_eq!(cfg.tick_interval, Duration::from_millis(250));
        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.json_logs);
        assert_eq!(cfg.audit_path, Some(PathBuf::from("/tmp/audit.jsonl")));
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let cfg = parse(&["--equipment", "many", "--tick-interval-ms", "soon"]);
        assert_eq!(cfg.equipment_count, 5);
        assert_eq!(cfg.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let cfg = parse(&["--frobnicate", "--equipment", "3"]);
        assert_eq!(cfg.equipment_count, 3);
    }
}
