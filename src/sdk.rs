/// Browser-side enhancement script served as `/static/app.js`.
///
/// Reads the serving host once from the page's `<meta name=host>`, then
/// rebuilds the install link on every email change by asking the runtime for
/// a fresh bookmarklet. The light-box and slide-deck widgets are third-party
/// collaborators; the script only dispatches to their public entry points.
pub fn app_script() -> String {
    r#"// Tinderizer install-page enhancement
(function() {
  var meta = document.querySelector('meta[name=host]');
  var host = meta ? meta.getAttribute('content') : window.location.host;

  function wire() {
    var email = document.getElementById('email');
    var link = document.getElementById('bookmarklet');
    if (email && link) {
      email.addEventListener('change', function() {
        var query = 'email=' + encodeURIComponent(this.value) +
          '&host=' + encodeURIComponent(host);
        fetch('/bookmarklet?' + query)
          .then(function(res) { return res.json(); })
          .then(function(body) { link.setAttribute('href', body.bookmarklet); })
          .catch(function(err) { console.warn('Tinderizer: bookmarklet rebuild failed', err); });
      });
    }

    // Mirror the current bookmarklet into the info panel when the modal opens.
    var panel = document.getElementById('ios');
    if (window.jQuery && panel && link) {
      jQuery(document).bind('reveal.facebox', function() {
        panel.textContent = link.getAttribute('href') || '';
      });
    }

    if (window.jQuery && jQuery.facebox) {
      jQuery.facebox.settings.closeImage = '/static/closelabel.png';
      jQuery.facebox.settings.loadingImage = '/static/loading.gif';
      jQuery('.facebox').facebox();
    }

    if (window.jQuery && jQuery.fn.slidedeck) {
      jQuery('.slidedeck').slidedeck().vertical();
      jQuery('a.vsnext').click(function() {
        jQuery('.slidedeck').slidedeck().vertical().next();
        return false;
      });
      jQuery('a.hsnext').click(function() {
        jQuery('.slidedeck').slidedeck().next();
        return false;
      });
    }
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', wire);
  } else {
    wire();
  }
})();
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_wires_email_change_to_bookmarklet_endpoint() {
        let script = app_script();
        assert!(script.contains("getElementById('email')"));
        assert!(script.contains("fetch('/bookmarklet?'"));
        assert!(script.contains("meta[name=host]"));
    }

    #[test]
    fn script_mirrors_link_into_info_panel() {
        let script = app_script();
        assert!(script.contains("reveal.facebox"));
        assert!(script.contains("getElementById('ios')"));
    }
}
