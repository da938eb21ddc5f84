//! 아티팩트 식별 -- 콘텐츠 해시, 파일 이름, 시스템 경로
//!
//! [`resolve_identity`]는 해석된 아티팩트 하나에 대해 안정적인 식별 정보를 계산합니다.
//! 해시 계산 실패는 치명적이지 않으며 경고와 카운터만 남기고 해시 없이 진행합니다.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::warn;
use trellis_core::metrics as m;

use crate::error::CollectorError;
use crate::reactor::ArtifactDescriptor;

/// 해시 계산 시 한 번에 읽는 바이트 수
const HASH_CHUNK_SIZE: usize = 8 * 1024;

/// 아티팩트 식별 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactIdentity {
    /// SHA-1 (소문자 hex)
    pub sha1: Option<String>,
    /// 표시용 파일 이름
    pub filename: Option<String>,
    /// 로컬 파일 절대 경로
    pub system_path: Option<PathBuf>,
}

/// 아티팩트의 식별 정보를 계산합니다.
///
/// - 파일이 존재하면 SHA-1을 계산하고, 파일 이름과 절대 경로를 기록합니다.
/// - 해시 계산에 실패해도 파일 이름과 경로는 유지됩니다.
/// - 파일이 없으면 확장자가 있을 때만 `{artifactId}-{version}.{extension}`을 사용합니다.
pub fn resolve_identity(artifact: &ArtifactDescriptor) -> ArtifactIdentity {
    let Some(file) = artifact.file.as_deref().filter(|f| f.exists()) else {
        return ArtifactIdentity {
            filename: synthesized_filename(artifact),
            ..ArtifactIdentity::default()
        };
    };

    let sha1 = match compute_sha1(file) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!(
                artifact = %artifact.coordinates,
                error = %e,
                "failed to compute artifact checksum, continuing without it"
            );
            metrics::counter!(m::COLLECTOR_HASH_FAILURES_TOTAL).increment(1);
            None
        }
    };

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_owned)
        .or_else(|| synthesized_filename(artifact));

    ArtifactIdentity {
        sha1,
        filename,
        system_path: Some(std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf())),
    }
}

/// 파일 내용의 SHA-1을 소문자 hex 문자열로 계산합니다.
///
/// 파일을 8 KiB 단위로 스트리밍하여 읽습니다.
pub fn compute_sha1(path: &Path) -> Result<String, CollectorError> {
    let to_err = |e: std::io::Error| CollectorError::HashComputation {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(to_err)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf).map_err(to_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// `{artifactId}-{version}.{extension}` 형식의 파일 이름 (확장자가 비어있으면 `None`)
pub fn synthesized_filename(artifact: &ArtifactDescriptor) -> Option<String> {
    let extension = artifact
        .extension
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())?;
    Some(format!(
        "{}-{}.{}",
        artifact.coordinates.artifact_id, artifact.coordinates.version, extension
    ))
}
