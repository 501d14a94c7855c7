//! CLI argument parsing using clap.

use clap::Parser;

#[derive(Parser)]
#[command(name = "filedesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "FILEDESK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "FILEDESK_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum request body size (accepts K, M, G suffixes)
    #[arg(long, env = "FILEDESK_MAX_UPLOAD_SIZE", default_value = "32M", value_parser = parse_byte_size)]
    pub max_upload_size: u64,

    /// Bytes read from each archive entry for content sniffing
    #[arg(
        long,
        default_value_t = 512,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=65536)
    )]
    pub sniff_len: usize,

    /// List `__MACOSX/` metadata entries instead of hiding them
    #[arg(long)]
    pub include_system_entries: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse byte size with optional suffix (K, M, G)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("100").unwrap(), 100);
        assert_eq!(parse_byte_size("1K").unwrap(), 1024);
        assert_eq!(parse_byte_size("32M").unwrap(), 32 * 1024 * 1024);
        assert_eq!(parse_byte_size("2G").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_byte_size("invalid").is_err());
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("18014398509481984M").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["filedesk"]).unwrap();
        assert_eq!(cli.max_upload_size, 32 * 1024 * 1024);
        assert_eq!(cli.sniff_len, 512);
        assert!(!cli.include_system_entries);
    }

    #[test]
    fn test_zero_sniff_len_rejected() {
        assert!(Cli::try_parse_from(["filedesk", "--sniff-len", "0"]).is_err());
    }
}
