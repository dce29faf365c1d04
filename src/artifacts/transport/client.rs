//! Smart-HTTP upload-pack client
//!
//! Three strictly sequential phases, single-shot (no retry):
//!
//! 1. **Discovery**: GET `<base>/info/refs?service=git-upload-pack` and pick
//!    the advertised id whose ref name mentions HEAD.
//! 2. **Negotiation**: POST a pkt-line framed `want`/flush/`done` body (no
//!    `have` lines: every fetch is full, not incremental).
//! 3. **Extraction**: demultiplex the side-band response, concatenating
//!    channel-1 payloads in packet order into the raw packfile stream.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::transport::pkt_line;
use crate::artifacts::transport::pkt_line::Packet;
use crate::errors::GitError;
use bytes::Bytes;
use colored::Colorize;

pub const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";

const UPLOAD_PACK_REQUEST_TYPE: &str = "application/x-git-upload-pack-request";
const UPLOAD_PACK_RESULT_TYPE: &str = "application/x-git-upload-pack-result";

/// Side-band channel carrying packfile bytes
const CHANNEL_PACK_DATA: u8 = 1;
/// Side-band channel carrying human-readable progress text
const CHANNEL_PROGRESS: u8 = 2;

pub struct PackClient {
    remote_url: String,
    http: reqwest::blocking::Client,
}

impl PackClient {
    pub fn new(remote_url: &str) -> Self {
        PackClient {
            remote_url: remote_url.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Fetch the remote HEAD commit id and the raw packfile that contains
    /// its full object closure
    pub fn fetch(&self) -> anyhow::Result<(ObjectId, Bytes)> {
        let head = self.discover_head()?;
        let pack = self.negotiate(&head)?;

        Ok((head, pack))
    }

    fn discover_head(&self) -> anyhow::Result<ObjectId> {
        let url = format!(
            "{}/info/refs?service={}",
            self.remote_url, UPLOAD_PACK_SERVICE
        );
        let advertisement = self
            .http
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(|e| GitError::TransportFailure(format!("ref discovery failed: {e}")))?;

        Self::find_head_ref(&pkt_line::parse(&advertisement)?)
    }

    /// Extract the id advertised for HEAD from discovery packets
    ///
    /// Service-banner comments (`#`-prefixed) and flushes are skipped; ref
    /// lines look like `<40-hex-id> <ref-name>[\0<capabilities>]`.
    fn find_head_ref(packets: &[Packet]) -> anyhow::Result<ObjectId> {
        for packet in packets {
            let Packet::Data(line) = packet else {
                continue;
            };
            if line.first() == Some(&b'#') {
                continue;
            }

            let line = String::from_utf8_lossy(line);
            let Some((id, ref_name)) = line.split_once(' ') else {
                continue;
            };

            if id.len() == OBJECT_ID_LENGTH && ref_name.contains("HEAD") {
                return ObjectId::try_parse(id.to_string());
            }
        }

        Err(GitError::NoHeadRef.into())
    }

    fn negotiate(&self, want: &ObjectId) -> anyhow::Result<Bytes> {
        let mut body = pkt_line::data_packet(format!("want {want}\n").as_bytes());
        body.extend_from_slice(pkt_line::FLUSH_PACKET);
        body.extend_from_slice(&pkt_line::data_packet(b"done\n"));

        let url = format!("{}/{}", self.remote_url, UPLOAD_PACK_SERVICE);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, UPLOAD_PACK_REQUEST_TYPE)
            .header(reqwest::header::ACCEPT, UPLOAD_PACK_RESULT_TYPE)
            .body(body)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(|e| GitError::TransportFailure(format!("pack negotiation failed: {e}")))?;

        Self::demux_pack_stream(&pkt_line::parse(&response)?)
    }

    /// Reassemble the packfile from side-band packets
    ///
    /// Channel-1 payloads are concatenated in packet order; reordering would
    /// corrupt the pack.
    fn demux_pack_stream(packets: &[Packet]) -> anyhow::Result<Bytes> {
        let mut pack = Vec::new();

        for packet in packets {
            let Packet::Data(payload) = packet else {
                continue;
            };
            let (channel, data) = payload.split_first().ok_or_else(|| {
                GitError::TransportFailure("empty side-band packet".to_string())
            })?;

            match *channel {
                CHANNEL_PACK_DATA => pack.extend_from_slice(data),
                CHANNEL_PROGRESS => {
                    eprint!("{}", format!("remote: {}", String::from_utf8_lossy(data)).dimmed());
                }
                other => {
                    eprintln!("{}", format!("warning: unknown side-band channel {other}").yellow());
                }
            }
        }

        Ok(Bytes::from(pack))
    }
}
