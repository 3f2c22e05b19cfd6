mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{auth_request, challenge_response, enrollment_response, form_value};
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use tds_mpi::domain::message::{Message, MessageType};
use tds_mpi::infrastructure::codec::{DeflateCodec, decode_payload};
use tds_mpi::interfaces::html::redirect::PAYLOAD_FIELD;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"{
    "directories": {"ThreeDSecure": ["http://127.0.0.1:9/ds"]},
    "directory_timeout_secs": 2,
    "merchants": [{
        "merchant_id": "m-1",
        "acquirer_bin": "412345",
        "name": "Example Shop",
        "country_code": "840",
        "default_currency": "840",
        "default_url": "https://shop.example.com"
    }]
}"#;

const RANGES: &str = "begin,end,action\n4111000000000000,4111999999999999,A\n";

fn file_with(contents: &str) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

fn verify_request(pan: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MPI_Interface>
  <VerifyEnrollmentReq id="req-1">
    <version>1.0.2</version>
    <merchantID>m-1</merchantID>
    <pan>{pan}</pan>
    <expiry>2912</expiry>
    <purchAmount>1234</purchAmount>
    <currency>840</currency>
    <exponent>2</exponent>
    <merchantData>order-77</merchantData>
  </VerifyEnrollmentReq>
</MPI_Interface>"#
    )
}

#[test]
fn test_cli_not_enrolled_from_ranges() -> Result<(), Box<dyn std::error::Error>> {
    let config = file_with(CONFIG)?;
    let ranges = file_with(RANGES)?;
    let request = file_with(&verify_request("5500000000000004"))?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(request.path())
        .arg("--config")
        .arg(config.path())
        .arg("--ranges")
        .arg(ranges.path())
        .arg("--serial")
        .arg("7");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<VerifyEnrollmentRes"))
        .stdout(predicate::str::contains("<enrolled>N</enrolled>"))
        .stdout(predicate::str::contains("<iReqCode>000</iReqCode>"))
        .stdout(predicate::str::contains("<merchantData>order-77</merchantData>"));

    Ok(())
}

#[test]
fn test_cli_invalid_request_yields_error_message() -> Result<(), Box<dyn std::error::Error>> {
    let config = file_with(CONFIG)?;
    let request = file_with(&verify_request("not-a-pan"))?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(request.path()).arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<MPI_Interface><Error"))
        .stdout(predicate::str::contains("<errorCode>5</errorCode>"))
        .stdout(predicate::str::contains("pan:"));

    Ok(())
}

#[test]
fn test_cli_unreachable_directory() -> Result<(), Box<dyn std::error::Error>> {
    let config = file_with(CONFIG)?;
    let request = file_with(&verify_request("4111111111111111"))?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(request.path()).arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<errorCode>98</errorCode>"));

    Ok(())
}

#[test]
fn test_cli_missing_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let request = file_with(&verify_request("4111111111111111"))?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(request.path())
        .arg("--config")
        .arg("/nonexistent/config.json");

    cmd.assert().failure();

    Ok(())
}

#[test]
fn test_cli_rejects_bad_range_file() -> Result<(), Box<dyn std::error::Error>> {
    let config = file_with(CONFIG)?;
    let ranges = file_with("begin,end,action\n1,2,A\n3,4,D\n")?;
    let request = file_with(&verify_request("4111111111111111"))?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(request.path())
        .arg("--config")
        .arg(config.path())
        .arg("--ranges")
        .arg(ranges.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid card range delta"));

    Ok(())
}

#[test]
fn test_cli_answers_every_request_path_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let config = file_with(CONFIG)?;
    let ranges = file_with(RANGES)?;
    let not_enrolled = file_with(&verify_request("5500000000000004"))?;
    let invalid = file_with(&verify_request("not-a-pan"))?;

    let output = Command::new(cargo_bin!())
        .arg(not_enrolled.path())
        .arg(invalid.path())
        .arg("--config")
        .arg(config.path())
        .arg("--ranges")
        .arg(ranges.path())
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let enrolled_at = stdout.find("<enrolled>N</enrolled>").ok_or("no enrollment answer")?;
    let error_at = stdout.find("<errorCode>5</errorCode>").ok_or("no error answer")?;
    assert!(enrolled_at < error_at);

    Ok(())
}

fn session_config(directory_url: &str) -> String {
    CONFIG.replace("http://127.0.0.1:9/ds", directory_url)
}

/// Reads stdout up to the end of the next response document.
fn read_response(stdout: &mut impl BufRead) -> Result<String, Box<dyn std::error::Error>> {
    let mut response = String::new();
    while stdout.read_line(&mut response)? > 0 {
        if response.trim_end().ends_with("</MPI_Interface>") {
            return Ok(response.trim().to_string());
        }
    }
    Err(format!("session ended before a full response: {response:?}").into())
}

#[test]
fn test_cli_session_completes_both_legs() -> Result<(), Box<dyn std::error::Error>> {
    let mut directory = mockito::Server::new();
    let enrollment = directory
        .mock("POST", "/ds")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body_from_request(|request| {
            let body = request.utf8_lossy_body().unwrap_or_default();
            match Message::from_wire(&body) {
                Ok(vereq) => enrollment_response(&vereq, "Y").to_wire().into_bytes(),
                Err(_) => Vec::new(),
            }
        })
        .create();
    let config = file_with(&session_config(&format!("{}/ds", directory.url())))?;

    let mut child = Command::new(cargo_bin!())
        .arg("--config")
        .arg(config.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;
    let mut stdin = child.stdin.take().ok_or("stdin not captured")?;
    let mut stdout = BufReader::new(child.stdout.take().ok_or("stdout not captured")?);

    writeln!(stdin, "{}\n", verify_request("4111111111111111"))?;
    let verify = Message::from_wire(&read_response(&mut stdout)?)?;
    assert_eq!(verify.kind(), MessageType::VerifyResponse);
    assert_eq!(verify.get("enrolled"), Some("Y"));
    let transaction_id = verify.get("transactionID").ok_or("no transaction id")?;
    let html = verify.get("htmlForm").ok_or("no redirect form")?;
    let payload = form_value(html, PAYLOAD_FIELD).ok_or("no challenge payload")?;

    // Play the issuer: answer the challenge that was sent to the browser.
    let challenge = Message::from_wire(&decode_payload(&DeflateCodec::new(), &payload)?)?;
    let answer = challenge_response(&challenge, "Y");
    writeln!(stdin, "{}\n", auth_request(transaction_id, &answer).to_wire())?;
    drop(stdin);

    let auth = Message::from_wire(&read_response(&mut stdout)?)?;
    assert!(child.wait()?.success());
    enrollment.assert();

    assert_eq!(auth.kind(), MessageType::AuthResponse);
    assert_eq!(auth.get("transactionID"), Some(transaction_id));
    assert_eq!(auth.get("merchantData"), Some("order-77"));
    // No signing backend is configured, so the result is released as U.
    assert_eq!(auth.get("status"), Some("U"));

    Ok(())
}
