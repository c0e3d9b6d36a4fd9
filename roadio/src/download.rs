use std::io::{stdout, Read, Write};
use std::path::Path;

use roadutil::{prettyprint_usize, Error, Result};

const CHUNK_BYTES: usize = 64 * 1024;

/// Sent with dataset downloads.
pub const USER_AGENT: &str = concat!("roadwork/", env!("CARGO_PKG_VERSION"));

/// The blocking client behind every request the pipeline makes. Requests never time out; the
/// full construction dataset can take a while on a slow link.
pub fn http_client(user_agent: &str) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(None)
        .build()
}

/// Downloads bytes from a URL with a blocking GET. If `quiet` is false, prints progress. Any
/// transport failure or non-success status is a network error.
pub fn download_bytes<I: AsRef<str>>(url: I, quiet: bool) -> Result<Vec<u8>> {
    let url = url.as_ref();
    let client = http_client(USER_AGENT).map_err(|err| Error::network(url, err))?;
    let mut resp = client
        .get(url)
        .send()
        .map_err(|err| Error::network(url, err))?;
    if let Err(err) = resp.error_for_status_ref() {
        return Err(Error::network(url, err));
    }

    let total_size = resp.content_length().map(|x| x as usize);
    let mut bytes = Vec::new();
    let mut chunk = vec![0; CHUNK_BYTES];
    loop {
        let n = resp.read(&mut chunk).map_err(|err| Error::network(url, err))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);

        if let Some(total) = total_size {
            if !quiet {
                roadutil::clear_current_line();
                print!(
                    "{:.2}% ({} / {} bytes)",
                    (bytes.len() as f64) / (total as f64) * 100.0,
                    prettyprint_usize(bytes.len()),
                    prettyprint_usize(total)
                );
                // Progress output is best-effort
                let _ = stdout().flush();
            }
        }
    }
    if !quiet && total_size.is_some() {
        println!();
    }
    debug!("Downloaded {} bytes from {}", prettyprint_usize(bytes.len()), url);
    Ok(bytes)
}

/// Downloads a file. If `quiet` is false, prints progress.
pub fn download_to_file<I: AsRef<str>, P: AsRef<Path>>(url: I, path: P, quiet: bool) -> Result<()> {
    let bytes = download_bytes(url, quiet)?;
    crate::write_file(path, &bytes)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::time::Duration;

    use super::*;

    /// Serves one response on a local port after a pause, returning the URL.
    fn serve_once(delay: Duration, response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/data.geojson", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            std::thread::sleep(delay);
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
        });
        url
    }

    #[test]
    fn slow_server_still_delivers() {
        let url = serve_once(
            Duration::from_millis(300),
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        );
        assert_eq!(download_bytes(&url, true).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn error_status_is_a_network_error() {
        let url = serve_once(
            Duration::from_millis(0),
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        assert!(matches!(
            download_bytes(&url, true),
            Err(Error::Network { .. })
        ));
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        // Nothing listens on port 9 of the loopback interface
        let err = download_bytes("http://127.0.0.1:9/data.geojson", true).unwrap_err();
        match err {
            Error::Network { url, .. } => assert_eq!(url, "http://127.0.0.1:9/data.geojson"),
            x => panic!("unexpected {}", x),
        }
    }

    #[test]
    fn failed_download_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        assert!(download_to_file("http://127.0.0.1:9/x", &path, true).is_err());
        assert!(!path.exists());
    }
}
