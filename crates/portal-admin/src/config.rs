use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow,
  bail
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const DEFAULT_BASE_URL: &str =
  "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Config {
  map: BTreeMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          BTreeMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "api.base_url".to_string(),
      DEFAULT_BASE_URL.to_string()
    );
    cfg
  }

  #[tracing::instrument(skip(
    portalrc_override
  ))]
  pub fn load(
    portalrc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let portalrc = resolve_portalrc_path(
      portalrc_override
    )?;
    if let Some(path) = portalrc {
      info!(portalrc = %path.display(), "loading portalrc");
      cfg.load_file(&path, &mut Vec::new())?;
    } else {
      warn!(
        "no portalrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  pub fn base_url(&self) -> String {
    self
      .get("api.base_url")
      .map(|url| {
        url.trim_end_matches('/').to_string()
      })
      .unwrap_or_else(|| {
        DEFAULT_BASE_URL.to_string()
      })
  }

  pub fn cookie(&self) -> Option<String> {
    self
      .get("api.cookie")
      .filter(|value| !value.trim().is_empty())
  }

  /// `None` leaves the transport default
  /// in place.
  pub fn timeout(
    &self
  ) -> anyhow::Result<Option<Duration>> {
    let Some(raw) =
      self.get("http.timeout_secs")
    else {
      return Ok(None);
    };
    let secs: u64 =
      raw.trim().parse().with_context(|| {
        format!(
          "invalid http.timeout_secs \
           value '{raw}'"
        )
      })?;
    Ok((secs > 0)
      .then(|| Duration::from_secs(secs)))
  }

  /// `chain` holds the files currently
  /// being read, outermost first.
  #[tracing::instrument(skip(self, chain))]
  fn load_file(
    &mut self,
    path: &Path,
    chain: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let identity = fs::canonicalize(&path)
      .unwrap_or_else(|_| path.clone());
    if chain.contains(&identity) {
      let trail = chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
      bail!(
        "include cycle: {trail} -> {}",
        identity.display()
      );
    }

    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());
    chain.push(identity);

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once(" #")
      {
        line = before.trim();
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self.load_file(
            &include_path,
            chain
          )?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, "loaded config key");
      self.map.insert(key, value);
    }

    chain.pop();
    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_portalrc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(portalrc_env) =
    std::env::var("PORTALRC")
  {
    if portalrc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      portalrc_env
    )));
  }

  let Some(home) = dirs::home_dir() else {
    debug!(
      "cannot determine home directory; \
       skipping ~/.portalrc"
    );
    return Ok(None);
  };
  let candidate = home.join(".portalrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with(
    pairs: &[(&str, &str)]
  ) -> Config {
    let mut cfg = Config::defaults();
    cfg.apply_overrides(pairs.iter().map(
      |(k, v)| (k.to_string(), v.to_string())
    ));
    cfg
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let cfg = with(&[(
      "rc.api.base_url",
      "https://lms.example.edu/"
    )]);
    assert_eq!(
      cfg.base_url(),
      "https://lms.example.edu"
    );
    assert_eq!(
      cfg.get("api.base_url").as_deref(),
      Some("https://lms.example.edu/")
    );
  }

  #[test]
  fn zero_timeout_means_none() {
    assert_eq!(
      with(&[("http.timeout_secs", "0")])
        .timeout()
        .unwrap(),
      None
    );
    assert_eq!(
      with(&[("http.timeout_secs", " 15 ")])
        .timeout()
        .unwrap(),
      Some(Duration::from_secs(15))
    );
    assert!(
      with(&[("http.timeout_secs", "soon")])
        .timeout()
        .is_err()
    );
  }

  #[test]
  fn blank_cookie_is_ignored() {
    assert_eq!(
      with(&[("api.cookie", "  ")]).cookie(),
      None
    );
  }
}
