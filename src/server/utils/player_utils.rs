use crate::server::utils::mime_utils::HLS_MIME;

const HLS_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/hls.js@1";

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// minimal full-window player. hls sources go through hls.js unless the browser plays them
/// natively (safari), everything else is a plain video src
pub fn render_player(title: &str, stream_url: &str, mime: &str) -> String {
    let title = escape_html(title);
    let src = escape_html(stream_url);
    let mime = escape_html(mime);

    let hls_bootstrap = if mime == HLS_MIME {
        format!(
            r#"<script src="{cdn}"></script>
    <script>
      (function () {{
        var video = document.getElementById("player");
        var src = video.getAttribute("data-src");
        if (video.canPlayType("{hls}")) {{
          video.src = src;
        }} else if (window.Hls && Hls.isSupported()) {{
          var hls = new Hls();
          hls.loadSource(src);
          hls.attachMedia(video);
        }}
      }})();
    </script>"#,
            cdn = HLS_JS_CDN,
            hls = HLS_MIME,
        )
    } else {
        String::new()
    };

    // hls keeps the url in data-src so the browser doesn't try to fetch the playlist itself
    let source = if mime == HLS_MIME {
        format!(r#"data-src="{}""#, src)
    } else {
        format!(r#"src="{}" type="{}""#, src, mime)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
      html, body {{ margin: 0; height: 100%; background: #000; }}
      body {{ color: #ddd; font-family: sans-serif; }}
      video {{ width: 100%; height: calc(100% - 2.5em); background: #000; }}
      p {{ margin: 0; padding: 0.6em 1em; font-size: 0.9em; }}
    </style>
  </head>
  <body>
    <video id="player" controls autoplay playsinline {source}></video>
    <p>{title}</p>
    {hls_bootstrap}
  </body>
</html>
"#
    )
}
