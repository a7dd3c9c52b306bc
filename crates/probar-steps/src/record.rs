//! Screen recording of web steps.
//!
//! A recording runs in its own browser launched with video capture enabled.
//! The run is linked into the report before it starts, and the browser
//! context and browser are closed on every exit path.

use crate::config::FrameConfig;
use crate::driver::PageDriver;
use crate::report::ScenarioReport;
use crate::result::StepResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Replace characters that are invalid in file names with `_`
#[must_use]
pub fn valid_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// A browser session recording video
pub trait RecordingSession {
    /// Page type driven during the recording
    type Page: PageDriver;

    /// The recorded page
    fn page(&self) -> &Self::Page;

    /// Where the engine is writing the raw video
    fn video_path(&self) -> StepResult<PathBuf>;

    /// Close the browser context, finalizing the video
    fn close_context(&mut self) -> StepResult<()>;

    /// Copy the finalized video to `dest`
    fn save_video(&mut self, dest: &Path) -> StepResult<()>;

    /// Close the browser
    fn close_browser(&mut self) -> StepResult<()>;
}

/// Launches recording browsers
pub trait RecordingLauncher {
    /// Session type produced by this launcher
    type Session: RecordingSession;

    /// Launch a browser whose context records into `video_dir`
    fn launch(&self, headless: bool, video_dir: &Path) -> StepResult<Self::Session>;
}

/// Links step recordings into scenario reports
#[derive(Debug, Clone)]
pub struct ScreenRecorder {
    supported: bool,
    headless: bool,
    video_dir: PathBuf,
    screenshot_dir: String,
    output_dir: PathBuf,
}

impl ScreenRecorder {
    /// Recorder writing final videos under `output_dir/<feature>/`
    #[must_use]
    pub fn new(config: &FrameConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            supported: config.screen_record_supported,
            headless: config.headless,
            video_dir: PathBuf::from(&config.video_dir),
            screenshot_dir: config.screenshot_dir.clone(),
            output_dir: output_dir.into(),
        }
    }

    /// Record `script` and link the video to `step_index`.
    ///
    /// Returns the saved video path, or `None` when the device cannot record
    /// or the step index is outside the scenario.
    pub fn record_link<L, F>(
        &self,
        launcher: &L,
        report: &mut ScenarioReport,
        step_index: usize,
        script: F,
    ) -> StepResult<Option<PathBuf>>
    where
        L: RecordingLauncher,
        F: FnOnce(&<L::Session as RecordingSession>::Page) -> StepResult<()>,
    {
        tracing::info!(
            supported = self.supported,
            step_index,
            step_count = report.step_count,
            "link_record"
        );
        if !self.supported {
            report.embed(
                step_index,
                "<label>the device does not support screen recording</label>",
            );
            return Ok(None);
        }
        if !report.has_step(step_index) {
            return Ok(None);
        }

        let feature_name = valid_file_name(&report.feature_name);
        let file_name = format!(
            "{}{}{}.mp4",
            valid_file_name(&report.name),
            short_uuid(),
            chrono::Utc::now().timestamp_millis()
        );
        let feature_dir = self.output_dir.join(&feature_name);
        fs::create_dir_all(&feature_dir)?;

        report.embed(
            step_index,
            &format!(
                "<video controls width=\"375\"><source src=\"../{}/{feature_name}/{file_name}\" type=\"video/mp4\"></video>",
                self.screenshot_dir
            ),
        );
        let dest = feature_dir.join(file_name);
        tracing::info!(path = %dest.display(), "web record_link src_path");
        self.record(launcher, &dest, script)?;
        Ok(Some(dest))
    }

    /// Run `script` in a fresh recording browser and save the video to `dest`
    pub fn record<L, F>(&self, launcher: &L, dest: &Path, script: F) -> StepResult<()>
    where
        L: RecordingLauncher,
        F: FnOnce(&<L::Session as RecordingSession>::Page) -> StepResult<()>,
    {
        let mut guard = SessionGuard::new(launcher.launch(self.headless, &self.video_dir)?);

        let run = script(guard.session.page()).and_then(|()| {
            let raw = guard.session.video_path()?;
            tracing::info!(path = %raw.display(), "web_record path");
            Ok(())
        });
        let closed = guard.close_context();
        let saved = match (&run, &closed) {
            (Ok(()), Ok(())) => guard.session.save_video(dest),
            _ => Ok(()),
        };
        let browser = guard.close_browser();

        run.and(closed).and(saved).and(browser)
    }
}

/// Closes whatever the session still has open when dropped, including
/// during a panic in the recorded script
struct SessionGuard<S: RecordingSession> {
    session: S,
    context_open: bool,
    browser_open: bool,
}

impl<S: RecordingSession> SessionGuard<S> {
    fn new(session: S) -> Self {
        Self {
            session,
            context_open: true,
            browser_open: true,
        }
    }

    fn close_context(&mut self) -> StepResult<()> {
        self.context_open = false;
        self.session.close_context()
    }

    fn close_browser(&mut self) -> StepResult<()> {
        self.browser_open = false;
        self.session.close_browser()
    }
}

impl<S: RecordingSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.context_open {
            if let Err(e) = self.close_context() {
                tracing::warn!(error = %e, "recording context close failed");
            }
        }
        if self.browser_open {
            if let Err(e) = self.close_browser() {
                tracing::warn!(error = %e, "recording browser close failed");
            }
        }
    }
}

fn short_uuid() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;
    use crate::result::StepError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct LauncherState {
        calls: Vec<String>,
        fail_close_context: bool,
    }

    #[derive(Debug, Default, Clone)]
    struct FakeLauncher {
        state: Rc<RefCell<LauncherState>>,
    }

    impl FakeLauncher {
        fn calls(&self) -> Vec<String> {
            self.state.borrow().calls.clone()
        }
    }

    struct FakeSession {
        page: MockPage,
        video_dir: PathBuf,
        state: Rc<RefCell<LauncherState>>,
    }

    impl RecordingSession for FakeSession {
        type Page = MockPage;

        fn page(&self) -> &MockPage {
            &self.page
        }

        fn video_path(&self) -> StepResult<PathBuf> {
            self.state.borrow_mut().calls.push("video_path".into());
            Ok(self.video_dir.join("raw.webm"))
        }

        fn close_context(&mut self) -> StepResult<()> {
            let mut state = self.state.borrow_mut();
            state.calls.push("close_context".into());
            if state.fail_close_context {
                return Err(StepError::driver("context already closed"));
            }
            Ok(())
        }

        fn save_video(&mut self, dest: &Path) -> StepResult<()> {
            self.state.borrow_mut().calls.push("save_video".into());
            fs::write(dest, b"mp4")?;
            Ok(())
        }

        fn close_browser(&mut self) -> StepResult<()> {
            self.state.borrow_mut().calls.push("close_browser".into());
            Ok(())
        }
    }

    impl RecordingLauncher for FakeLauncher {
        type Session = FakeSession;

        fn launch(&self, headless: bool, video_dir: &Path) -> StepResult<FakeSession> {
            self.state
                .borrow_mut()
                .calls
                .push(format!("launch:{headless}"));
            Ok(FakeSession {
                page: MockPage::new(),
                video_dir: video_dir.to_path_buf(),
                state: Rc::clone(&self.state),
            })
        }
    }

    fn recorder(dir: &TempDir, supported: bool) -> ScreenRecorder {
        let config = FrameConfig::new().with_screen_record(supported);
        ScreenRecorder::new(&config, dir.path())
    }

    mod name_tests {
        use super::*;

        #[test]
        fn test_valid_file_name() {
            assert_eq!(valid_file_name("a/b:c*d?"), "a_b_c_d_");
            assert_eq!(valid_file_name("login <fast>"), "login _fast_");
            assert_eq!(valid_file_name("登录"), "登录");
        }

        #[test]
        fn test_short_uuid_len() {
            assert_eq!(short_uuid().len(), 8);
        }
    }

    mod link_tests {
        use super::*;

        #[test]
        fn test_unsupported_device_gets_label() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let mut report = ScenarioReport::new("f", "s", 3);
            let saved = recorder(&dir, false)
                .record_link(&launcher, &mut report, 1, |_| Ok(()))
                .unwrap();
            assert!(saved.is_none());
            assert_eq!(
                report.description(),
                ["embeddingsTags, stepIndex=1, <label>the device does not support screen recording</label>"]
            );
            assert!(launcher.calls().is_empty());
        }

        #[test]
        fn test_out_of_range_step_is_skipped() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let mut report = ScenarioReport::new("f", "s", 1);
            let saved = recorder(&dir, true)
                .record_link(&launcher, &mut report, 1, |_| Ok(()))
                .unwrap();
            assert!(saved.is_none());
            assert!(report.description().is_empty());
        }

        #[test]
        fn test_records_and_links_video() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let mut report = ScenarioReport::new("web/login", "ok", 2);
            let saved = recorder(&dir, true)
                .record_link(&launcher, &mut report, 0, |page: &MockPage| {
                    page.wait_for_timeout(1000.0)
                })
                .unwrap()
                .unwrap();

            assert!(saved.starts_with(dir.path().join("web_login")));
            assert!(saved.exists());
            let file_name = saved.file_name().unwrap().to_string_lossy().into_owned();
            assert!(file_name.starts_with("ok"));
            assert!(file_name.ends_with(".mp4"));
            assert_eq!(
                report.description()[0],
                format!(
                    "embeddingsTags, stepIndex=0, <video controls width=\"375\"><source src=\"../screenshot/web_login/{file_name}\" type=\"video/mp4\"></video>"
                )
            );
            assert_eq!(
                launcher.calls(),
                ["launch:true", "video_path", "close_context", "save_video", "close_browser"]
            );
        }
    }

    mod screenshot_dir_tests {
        use super::*;

        #[test]
        fn test_custom_screenshot_dir_in_video_src() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let config = FrameConfig::new().with_screenshot_dir("artifacts/shots");
            let mut report = ScenarioReport::new("cart", "checkout", 1);
            let saved = ScreenRecorder::new(&config, dir.path())
                .record_link(&launcher, &mut report, 0, |_| Ok(()))
                .unwrap()
                .unwrap();
            let file_name = saved.file_name().unwrap().to_string_lossy().into_owned();
            assert!(report.description()[0].contains(&format!(
                "src=\"../artifacts/shots/cart/{file_name}\""
            )));
        }
    }

    mod cleanup_tests {
        use super::*;
        use std::panic::{catch_unwind, AssertUnwindSafe};

        #[test]
        fn test_script_panic_still_closes() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let recorder = recorder(&dir, true);
            let dest = dir.path().join("v.mp4");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                recorder.record(&launcher, &dest, |_: &MockPage| -> StepResult<()> {
                    panic!("script crashed")
                })
            }));
            assert!(outcome.is_err());
            assert_eq!(
                launcher.calls(),
                ["launch:true", "close_context", "close_browser"]
            );
            assert!(!dest.exists());
        }

        #[test]
        fn test_script_failure_still_closes() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            let err = recorder(&dir, true)
                .record(&launcher, &dir.path().join("v.mp4"), |_| {
                    Err(StepError::Timeout { ms: 1000 })
                })
                .unwrap_err();
            assert!(matches!(err, StepError::Timeout { ms: 1000 }));
            assert_eq!(
                launcher.calls(),
                ["launch:true", "close_context", "close_browser"]
            );
        }

        #[test]
        fn test_context_close_failure_still_closes_browser() {
            let dir = TempDir::new().unwrap();
            let launcher = FakeLauncher::default();
            launcher.state.borrow_mut().fail_close_context = true;
            let err = recorder(&dir, true)
                .record(&launcher, &dir.path().join("v.mp4"), |_| Ok(()))
                .unwrap_err();
            assert!(matches!(err, StepError::Driver { .. }));
            assert_eq!(
                launcher.calls(),
                ["launch:true", "video_path", "close_context", "close_browser"]
            );
            assert!(!dir.path().join("v.mp4").exists());
        }
    }
}
