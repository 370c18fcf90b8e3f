mod readiness;
mod waker;
mod waker_set;

use readiness::Readiness;
use waker::SourceWaker;

pub(crate) use waker_set::WakerSet;
