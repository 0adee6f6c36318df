use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::testing::Asserter;

/// Something the runner can execute once with an [`Asserter`].
///
/// The test must eventually call [`Asserter::done`]; the runner waits for
/// that signal, not for the returned future.
pub trait Test: Send {
    fn call(self: Box<Self>, asserter: Asserter) -> BoxFuture<'static, ()>;
}

/// Adapts an async closure into a [`Test`].
pub struct FnTest<F>(F);

impl<F> FnTest<F> {
    pub fn new(f: F) -> Self {
        FnTest(f)
    }
}

impl<F, Fut> Test for FnTest<F>
where
    F: FnOnce(Asserter) -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(self: Box<Self>, asserter: Asserter) -> BoxFuture<'static, ()> {
        let FnTest(f) = *self;
        f(asserter).boxed()
    }
}

/// The ordered tests exported by one test module.
#[derive(Default)]
pub struct Suite {
    tests: Vec<(String, Box<dyn Test>)>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test(mut self, name: impl Into<String>, test: impl Test + 'static) -> Self {
        self.tests.push((name.into(), Box::new(test)));
        self
    }

    pub fn test_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(Asserter) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.test(name, FnTest::new(f))
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for Suite {
    type Item = (String, Box<dyn Test>);
    type IntoIter = std::vec::IntoIter<(String, Box<dyn Test>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.into_iter()
    }
}

/// One discovered test, ready to be scheduled.
pub struct TestEntry {
    pub file: String,
    pub name: String,
    pub test: Box<dyn Test>,
}

impl TestEntry {
    pub fn new(file: impl Into<String>, name: impl Into<String>, test: Box<dyn Test>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            test,
        }
    }
}

impl std::fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEntry")
            .field("file", &self.file)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}


impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("tests", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
