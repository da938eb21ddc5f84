//! Scope / 모듈 필터
//!
//! - [`ScopeFilter`]: 최상위 의존성 간선을 scope로 제외할지 결정
//! - [`ModuleFilter`]: reactor 모듈을 처리할지 결정 (packaging, 무시 플래그, include/exclude 패턴)
//!
//! # 모듈 판정 순서
//!
//! 1. packaging-only 모듈 무시가 켜져 있고 packaging이 `pom`이면 거부
//! 2. 루트 모듈이면 자신의 무시 플래그가 꺼져 있을 때만 승인
//! 3. exclude 패턴 중 하나와 일치하면 거부
//! 4. include 패턴이 있고 하나도 일치하지 않으면 거부
//! 5. 그 외 승인
//!
//! 패턴은 `*`만 와일드카드이며 나머지 문자는 모두 리터럴로 취급하고,
//! artifactId 전체가 일치해야 합니다.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use tracing::info;

use crate::error::CollectorError;
use crate::reactor::Module;

/// 무시할 scope가 설정되지 않았을 때의 기본값
pub const DEFAULT_IGNORED_SCOPES: [&str; 2] = ["test", "provided"];

/// scope 필터
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    ignored: BTreeSet<String>,
}

impl ScopeFilter {
    /// 기본 목록과 구버전 목록의 합집합으로 필터를 생성합니다.
    ///
    /// 합집합이 비어있으면 [`DEFAULT_IGNORED_SCOPES`]를 사용합니다.
    pub fn new(ignored_scopes: &[String], legacy_scopes: &[String]) -> Self {
        let mut ignored: BTreeSet<String> = ignored_scopes
            .iter()
            .chain(legacy_scopes)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        if ignored.is_empty() {
            ignored = DEFAULT_IGNORED_SCOPES.iter().map(|s| (*s).to_owned()).collect();
        }

        Self { ignored }
    }

    /// scope가 무시 대상인지 확인합니다 (대소문자 구분).
    ///
    /// 비어있거나 없는 scope는 무시하지 않습니다.
    pub fn should_ignore_scope(&self, scope: Option<&str>) -> bool {
        match scope {
            Some(s) if !s.trim().is_empty() => self.ignored.contains(s),
            _ => false,
        }
    }

    /// 실제로 적용되는 무시 scope 목록
    pub fn ignored_scopes(&self) -> impl Iterator<Item = &str> {
        self.ignored.iter().map(String::as_str)
    }
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

/// 컴파일된 글롭 패턴
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// 글롭 패턴을 정규식으로 컴파일합니다.
    pub fn compile(pattern: &str) -> Result<Self, CollectorError> {
        let translated = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("^(?:{translated})$")).map_err(|e| {
            CollectorError::Config {
                field: "patterns".to_owned(),
                reason: format!("invalid pattern '{pattern}': {e}"),
            }
        })?;

        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// 값 전체가 패턴과 일치하는지 확인합니다.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// 원본 패턴 문자열
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// 빈 패턴을 제외하고 모두 컴파일합니다.
fn compile_all(patterns: &[String]) -> Result<Vec<GlobPattern>, CollectorError> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(GlobPattern::compile)
        .collect()
}

/// 모듈 거부 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// packaging-only 모듈
    PomPackaging,
    /// 루트 모듈이 무시로 표시됨
    MarkedIgnored,
    /// exclude 패턴과 일치
    Excluded,
    /// include 패턴과 일치하지 않음
    NotIncluded,
}

impl SkipReason {
    /// 메트릭 레이블용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PomPackaging => "pom",
            Self::MarkedIgnored => "ignored",
            Self::Excluded => "excluded",
            Self::NotIncluded => "not_included",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PomPackaging => write!(f, "packaging-only module"),
            Self::MarkedIgnored => write!(f, "marked as ignored"),
            Self::Excluded => write!(f, "marked as excluded"),
            Self::NotIncluded => write!(f, "not marked as included"),
        }
    }
}

/// 모듈 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleDecision {
    /// 처리
    Accept,
    /// 건너뜀
    Skip(SkipReason),
}

/// 모듈 필터
#[derive(Debug, Clone)]
pub struct ModuleFilter {
    ignore_pom_modules: bool,
    includes: Vec<GlobPattern>,
    excludes: Vec<GlobPattern>,
}

impl ModuleFilter {
    /// 패턴을 한 번 컴파일하여 필터를 생성합니다.
    pub fn new(
        ignore_pom_modules: bool,
        includes: &[String],
        excludes: &[String],
    ) -> Result<Self, CollectorError> {
        Ok(Self {
            ignore_pom_modules,
            includes: compile_all(includes)?,
            excludes: compile_all(excludes)?,
        })
    }

    /// 모듈 처리 여부를 판정합니다. 첫 번째로 적용되는 규칙만 사용합니다.
    pub fn decide(&self, module: &Module, is_root: bool) -> ModuleDecision {
        let artifact_id = module.coordinates.artifact_id.as_str();

        if self.ignore_pom_modules && module.is_pom() {
            ModuleDecision::Skip(SkipReason::PomPackaging)
        } else if is_root {
            if module.ignore {
                ModuleDecision::Skip(SkipReason::MarkedIgnored)
            } else {
                ModuleDecision::Accept
            }
        } else if self.excludes.iter().any(|p| p.matches(artifact_id)) {
            ModuleDecision::Skip(SkipReason::Excluded)
        } else if !self.includes.is_empty() && !self.includes.iter().any(|p| p.matches(artifact_id))
        {
            ModuleDecision::Skip(SkipReason::NotIncluded)
        } else {
            ModuleDecision::Accept
        }
    }

    /// 모듈을 처리해야 하면 `true`. 거부 시 사유를 `info`로 기록합니다.
    pub fn should_process_module(&self, module: &Module, is_root: bool) -> bool {
        match self.decide(module, is_root) {
            ModuleDecision::Accept => true,
            ModuleDecision::Skip(reason) => {
                info!(module = %module.coordinates, reason = %reason, "skipping module");
                false
            }
        }
    }
}
