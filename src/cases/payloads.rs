//! Browser-side payloads
//!
//! Async bodies end by calling `done(error, value)`; on success `value` is
//! the payload's declared output (for example the class name of the
//! captured stream) so later steps never read page globals.

use crate::bridge::Payload;

/// getUserMedia with a fake camera, attach the stream, then detach it
pub const SRC_OBJECT_NULL: Payload = Payload::asynchronous(
    "srcObject null setter",
    r#"
var constraints = {video: true, fake: true};
navigator.mediaDevices.getUserMedia(constraints)
  .then(function (stream) {
    var video = document.createElement('video');
    video.setAttribute('id', 'video');
    video.setAttribute('autoplay', 'true');
    document.body.appendChild(video);
    video.srcObject = stream;
    video.srcObject = null;
    done(null, {streamClass: stream.constructor.name});
  })
  .catch(function (err) {
    done(err.name || String(err));
  });
"#,
);

/// getUserMedia, attach the stream; the element joins the DOM on loadedmetadata
pub const ATTACH_STREAM: Payload = Payload::asynchronous(
    "attach mediaStream",
    r#"
var constraints = {video: true, fake: true};
navigator.mediaDevices.getUserMedia(constraints)
  .then(function (stream) {
    var video = document.createElement('video');
    video.setAttribute('id', 'video');
    video.setAttribute('autoplay', 'true');
    video.addEventListener('loadedmetadata', function () {
      document.body.appendChild(video);
    });
    video.srcObject = stream;
    done(null, {streamClass: stream.constructor.name});
  })
  .catch(function (err) {
    done(err.name || String(err));
  });
"#,
);

/// Attach to a first element, then hand its srcObject to a second one
pub const REATTACH_STREAM: Payload = Payload::asynchronous(
    "re-attach mediaStream",
    r#"
var constraints = {video: true, fake: true};
navigator.mediaDevices.getUserMedia(constraints)
  .then(function (stream) {
    var video = document.createElement('video');
    var video2 = document.createElement('video');
    video.setAttribute('id', 'video');
    video.setAttribute('autoplay', 'true');
    video2.setAttribute('id', 'video2');
    video2.setAttribute('autoplay', 'true');
    video.addEventListener('loadedmetadata', function () {
      document.body.appendChild(video);
      video2.srcObject = video.srcObject;
    });
    video2.addEventListener('loadedmetadata', function () {
      document.body.appendChild(video2);
    });
    video.srcObject = stream;
    done(null, {streamClass: stream.constructor.name});
  })
  .catch(function (err) {
    done(err.name || String(err));
  });
"#,
);

/// getUserMedia with a frame rate no device can deliver
pub const IMPOSSIBLE_CONSTRAINTS: Payload = Payload::asynchronous(
    "impossible constraints",
    r#"
var impossibleConstraints = {
  video: {
    width: 1280,
    height: {min: 200, ideal: 720, max: 1080},
    frameRate: {exact: 0}
  }
};
// Firefox fake devices accept anything; ask for a real one.
if (window.adapter.browserDetails.browser === 'firefox') {
  impossibleConstraints.fake = false;
}
navigator.mediaDevices.getUserMedia(impossibleConstraints)
  .then(function (stream) {
    stream.getTracks().forEach(function (track) { track.stop(); });
    done(null, {streamClass: stream.constructor.name});
  })
  .catch(function (err) {
    done(err.name || String(err));
  });
"#,
);

/// Swap console.log, log once, restore, and report the shim's public API types
pub const CONSOLE_LOGGING: Payload = Payload::sync(
    "console logging",
    r#"
var logCount = 0;
var saveConsole = console.log.bind(console);
console.log = function () {
  logCount++;
};
console.log('log me');
console.log = saveConsole;

return {
  logCount: logCount,
  checks: [
    [typeof RTCPeerConnection, 'function', 'RTCPeerConnection is a function'],
    [typeof navigator.getUserMedia, 'function', 'getUserMedia is a function'],
    [typeof window.adapter.browserDetails.browser, 'string',
      'browserDetails.browser browser is a string'],
    [typeof window.adapter.browserDetails.version, 'number',
      'browserDetails.version is a number']
  ]
};
"#,
);

/// Runtime probe: firefox before 42 cannot reject impossible constraints
pub const FIREFOX_BEFORE_42: &str =
    "return adapter.browserDetails.browser === 'firefox' && adapter.browserDetails.version < 42;";
