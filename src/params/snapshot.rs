//! Param snapshots derived from the current URL.

use crate::error::Result;
use crate::history;
use crate::types::ParamMap;
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// Derive the parameter mapping of a search string.
///
/// Pure: equal inputs give equal (not identical) mappings.
pub fn derive_params(search: &str) -> ParamMap {
    ParamMap::from_query(search)
}

struct Current {
    search: String,
    params: Rc<ParamMap>,
}

thread_local! {
    static CURRENT: RefCell<Option<Current>> = const { RefCell::new(None) };
}

/// The snapshot for the backend's current URL.
///
/// Reuses the cached snapshot while the search string is unchanged, so that
/// at any instant exactly one snapshot is current.
pub fn current_snapshot() -> Result<Rc<ParamMap>> {
    let href = history::backend()?.href()?;
    let url = Url::parse(&href)?;
    let search = url.query().unwrap_or("");

    CURRENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(current) = slot.as_ref() {
            if current.search == search {
                return Ok(Rc::clone(&current.params));
            }
        }

        let params = Rc::new(derive_params(search));
        *slot = Some(Current {
            search: search.to_string(),
            params: Rc::clone(&params),
        });
        Ok(params)
    })
}
