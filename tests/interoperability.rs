//! Known-answer checks against values produced by the reference Hawk implementation.

use hawkc::{
    algorithm_by_name, Context, ErrorCode, MacType, PayloadHasher, WwwAuthenticateHeader, SHA1,
    SHA256,
};
use pretty_assertions::assert_eq;

const ID: &str = "dh37fgj492je";
const KEY: &str = "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn";
const TS: i64 = 1353832234;
const NONCE: &str = "j4h3g2";

fn request_context<'a>(method: &'a str) -> Context<'a> {
    let mut ctx = Context::new();
    ctx.set_algorithm(&SHA256);
    ctx.set_password(KEY);
    ctx.set_id(ID);
    ctx.set_method(method);
    ctx.set_host("example.com");
    ctx.set_port("8000");
    ctx.set_path("/resource/1?b=1&a=2");
    ctx.set_ts(TS);
    ctx.set_nonce(NONCE);
    ctx
}

fn produce(ctx: &mut Context<'_>) -> String {
    let len = ctx.calculate_authorization_header_length().unwrap();
    let mut buf = vec![0u8; len];
    assert_eq!(ctx.create_authorization_header(&mut buf).unwrap(), len);
    String::from_utf8(buf).unwrap()
}

#[test]
fn readme_get_header() {
    let mut ctx = request_context("GET");
    ctx.set_ext("some-app-ext-data");
    let header = produce(&mut ctx);
    assert_eq!(
        header,
        "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
         mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\", ext=\"some-app-ext-data\""
    );

    // parsing the produced header gives back what went in
    let mut server = Context::new();
    server.parse_authorization_header(&header).unwrap();
    let parsed = server.authorization_header_in();
    assert_eq!(parsed.id, Some(ID.as_bytes()));
    assert_eq!(parsed.ts, Some(TS));
    assert_eq!(parsed.nonce, Some(NONCE.as_bytes()));
    assert_eq!(
        parsed.mac,
        Some(&b"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="[..])
    );
    assert_eq!(parsed.ext, Some(&b"some-app-ext-data"[..]));
}

#[test]
fn readme_post_with_payload() {
    let hash = PayloadHasher::hash("text/plain", &SHA256, "Thank you for flying Hawk").unwrap();
    assert_eq!(hash, "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=");

    let mut ctx = request_context("POST");
    ctx.set_hash(&hash);
    ctx.set_ext("some-app-ext-data");
    let header = produce(&mut ctx);
    assert_eq!(
        header,
        "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
         mac=\"aSe1DERmZuRl3pI36/9BdZmnErTw3sNzOOAUlfeKjVw=\", \
         hash=\"Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=\", ext=\"some-app-ext-data\""
    );
}

#[test]
fn header_without_ext() {
    let mut ctx = request_context("GET");
    assert!(produce(&mut ctx).contains("mac=\"nfp3t5BVkMvjhU3PrD0ftTp7NcVpETEX2HEi/Fo4S2g=\""));
}

#[test]
fn sha1_headers() {
    let mut ctx = request_context("GET");
    ctx.set_algorithm(algorithm_by_name("sha1").unwrap());
    assert!(produce(&mut ctx).contains("mac=\"ic6931LDf4AXFTV+ikHjEoHh5AM=\""));
    ctx.set_ext("some-app-ext-data");
    assert!(produce(&mut ctx).contains("mac=\"KqOejc9yo2NAQlM29iSeYQEzwmE=\""));
}

#[test]
fn negative_timestamp() {
    let mut ctx = request_context("GET");
    ctx.set_ext("some-app-ext-data");
    ctx.set_ts(-TS);
    let header = produce(&mut ctx);
    assert!(header.contains("ts=\"-1353832234\""));
    assert!(header.contains("mac=\"XBfSFwyRhvChhicaZtXNJIRGjsp8vuXw4BkTFVvgtA0=\""));
}

#[test]
fn escaped_ext_signed_as_written() {
    let mut ctx = request_context("GET");
    ctx.set_ext(r#"quote \" here"#);
    let header = produce(&mut ctx);
    assert!(header.contains(r#"ext="quote \" here""#));
    assert!(header.contains("mac=\"1nAuNi2oAdpZ3XdDjFRjkKdoXDw1kQOdeTEsmqEbyFs=\""));

    let mut server = request_context("GET");
    server.parse_authorization_header(&header).unwrap();
    assert!(server.validate_hmac().unwrap());
}

#[test]
fn server_authorization() {
    let mut ctx = request_context("POST");
    ctx.set_mac_type(MacType::Response);
    ctx.set_hash("Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=");
    ctx.set_ext("response-specific");
    assert_eq!(
        produce(&mut ctx),
        "Hawk mac=\"45o1OiuNP0QN7DnK3kMDylzh2ocFnF2eEZNY+90LowI=\", \
         hash=\"Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=\", ext=\"response-specific\""
    );
}

#[test]
fn www_authenticate() {
    let mut ctx = Context::new();
    ctx.set_algorithm(&SHA256);
    ctx.set_password(KEY);
    ctx.set_www_authenticate_ts(TS);
    let len = ctx.calculate_www_authenticate_header_length().unwrap();
    let mut buf = vec![0u8; len];
    ctx.create_www_authenticate_header(&mut buf).unwrap();
    assert_eq!(
        buf,
        &b"Hawk ts=\"1353832234\", tsm=\"2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=\""[..]
    );
    let parsed = WwwAuthenticateHeader::parse(&buf).unwrap();
    assert_eq!(parsed.ts, Some(TS));
}

#[test]
fn reference_challenge_with_error() {
    let header = "Hawk ts=\"1353832234\", tsm=\"2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=\", \
                  error=\"Stale timestamp\"";
    let mut ctx = Context::new();
    ctx.set_algorithm(&SHA256);
    ctx.set_password(KEY);
    ctx.parse_www_authenticate_header(header).unwrap();
    assert!(ctx.validate_www_authenticate_tsm().unwrap());
}

#[test]
fn unknown_algorithm() {
    let err = algorithm_by_name("md5").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownAlgorithm);
    assert_eq!(algorithm_by_name("SHA1").unwrap().name(), SHA1.name());
}
