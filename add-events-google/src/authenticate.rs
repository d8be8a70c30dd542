//! Interactive installed-app OAuth flow over a loopback redirect.

use anyhow::{Context, Result};
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::client_secret::ClientSecret;
use crate::session::SessionData;

/// Run the browser consent flow and exchange the code for tokens.
pub async fn run(secret: &ClientSecret, scopes: &[&str]) -> Result<SessionData> {
    let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();

    // Any free port; desktop clients accept every loopback port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind OAuth callback listener")?;
    let port = listener
        .local_addr()
        .context("Failed to read OAuth callback address")?
        .port();

    let mut client = Client::new(
        secret.client_id.clone(),
        secret.client_secret.clone(),
        format!("http://127.0.0.1:{}/", port),
        String::new(),
        String::new(),
    );

    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authorize calendar access:\n");
    eprintln!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = wait_for_callback(listener).await?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let access_token = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange authorization code for tokens")?;

    Ok((&access_token).into())
}

async fn wait_for_callback(listener: TcpListener) -> Result<(String, String)> {
    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let outcome = parse_callback(&request_line);

    let body = match &outcome {
        Ok(_) => "<h1>Authorization complete</h1>\
            <p>You can close this window and return to the terminal.</p>"
            .to_string(),
        Err(e) => format!("<h1>Authorization failed</h1><p>{}</p>", e),
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{}</body></html>",
        body
    );

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    outcome
}

/// Pull `code` and `state` out of the redirect's request line,
/// e.g. `GET /?state=abc&code=4/0Ab HTTP/1.1`.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was denied: {}", error);
    }

    let code = param("code").ok_or_else(|| anyhow::anyhow!("No code in callback"))?;
    let state = param("state").ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    Ok((code, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_code_and_state() {
        let (code, state) =
            parse_callback("GET /?state=xyz&code=4%2F0AbC&scope=calendar HTTP/1.1\r\n").unwrap();

        assert_eq!(code, "4/0AbC");
        assert_eq!(state, "xyz");
    }

    #[test]
    fn denied_consent_is_an_error() {
        let err = parse_callback("GET /?error=access_denied&state=xyz HTTP/1.1").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn missing_code_is_an_error() {
        assert!(parse_callback("GET /?state=xyz HTTP/1.1").is_err());
        assert!(parse_callback("").is_err());
    }

    #[tokio::test]
    async fn callback_listener_replies_to_browser() {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpStream;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /?code=abc&state=s1 HTTP/1.1\r\n")
                .await
                .unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).await.unwrap();
            reply
        });

        let (code, state) = wait_for_callback(listener).await.unwrap();
        let reply = browser.await.unwrap();

        assert_eq!((code.as_str(), state.as_str()), ("abc", "s1"));
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.contains("Authorization complete"));
    }
}
